//! Form controls and the HTML page that hosts them.
//!
//! The page is rendered once per request from [`controls`]. Choice controls
//! never carry a pre-selected answer, so an untouched control is submitted
//! as `null` and rejected by validation.

use std::fmt::Write;

use crate::models::{AgeGroup, GenHlth, Sex, YesNo, BMI_MAX, BMI_MIN, BMI_STEP};

pub const PAGE_TITLE: &str = "Diabetes Health Indicator";

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    YesNo,
    Slider { min: f64, max: f64, step: f64 },
    Select { options: Vec<(String, String)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub field: &'static str,
    pub question: &'static str,
    pub kind: ControlKind,
}

impl Control {
    fn yes_no(field: &'static str, question: &'static str) -> Self {
        Control {
            field,
            question,
            kind: ControlKind::YesNo,
        }
    }
}

/// One control per feature, in page order.
pub fn controls() -> Vec<Control> {
    vec![
        Control::yes_no(
            "HighBP",
            "Have you ever been diagnosed with high blood pressure?",
        ),
        Control::yes_no("HighChol", "Do you have high cholesterol levels?"),
        Control {
            field: "BMI",
            question: "What is your current BMI?",
            kind: ControlKind::Slider {
                min: BMI_MIN,
                max: BMI_MAX,
                step: BMI_STEP,
            },
        },
        Control::yes_no(
            "Smoker",
            "Are you a smoker or have you smoked in the past?",
        ),
        Control::yes_no("Stroke", "Have you ever experienced a stroke?"),
        Control::yes_no(
            "HeartDiseaseorAttack",
            "Have you been diagnosed with heart disease or suffered a heart attack?",
        ),
        Control::yes_no(
            "PhysActivity",
            "Have you done any physical activity in the past 30 days?",
        ),
        Control::yes_no("HvyAlcoholConsump", "Do you consume alcohol heavily?"),
        Control::yes_no("DiffWalk", "Do you experience difficulty walking?"),
        Control {
            field: "Sex",
            question: "Are you male or female?",
            kind: ControlKind::Select {
                options: Sex::ALL
                    .iter()
                    .map(|s| (s.label().to_string(), s.label().to_string()))
                    .collect(),
            },
        },
        Control {
            field: "GenHlth",
            question: "How is your overall health?",
            kind: ControlKind::Select {
                options: GenHlth::ALL
                    .iter()
                    .map(|g| (g.label().to_string(), g.label().to_string()))
                    .collect(),
            },
        },
        Control {
            field: "Age",
            question: "What is your age?",
            kind: ControlKind::Select {
                options: AgeGroup::all()
                    .map(|a| (a.code().to_string(), a.code().to_string()))
                    .collect(),
            },
        },
    ]
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_control(out: &mut String, control: &Control) {
    let field = escape(control.field);
    let question = escape(control.question);

    match &control.kind {
        ControlKind::YesNo => {
            let _ = write!(
                out,
                "<fieldset class=\"control\" data-field=\"{field}\" data-kind=\"choice\">\
                 <legend>{question}</legend>"
            );
            for answer in YesNo::ALL {
                let value = answer.label();
                let _ = write!(
                    out,
                    "<label><input type=\"radio\" name=\"{field}\" value=\"{value}\"> {value}</label>"
                );
            }
            out.push_str("</fieldset>\n");
        }
        ControlKind::Slider { min, max, step } => {
            let _ = write!(
                out,
                "<div class=\"control\" data-field=\"{field}\" data-kind=\"number\">\
                 <label for=\"{field}\">{question}</label>\
                 <input type=\"range\" id=\"{field}\" name=\"{field}\" \
                 min=\"{min:.1}\" max=\"{max:.1}\" step=\"{step}\" value=\"{min:.1}\">\
                 <output for=\"{field}\">{min:.1}</output></div>\n"
            );
        }
        ControlKind::Select { options } => {
            let kind = if control.field == "Age" { "integer" } else { "choice" };
            let _ = write!(
                out,
                "<div class=\"control\" data-field=\"{field}\" data-kind=\"{kind}\">\
                 <label for=\"{field}\">{question}</label>\
                 <select id=\"{field}\" name=\"{field}\">\
                 <option value=\"\" selected disabled>Choose an option</option>"
            );
            for (value, label) in options {
                let _ = write!(
                    out,
                    "<option value=\"{}\">{}</option>",
                    escape(value),
                    escape(label)
                );
            }
            out.push_str("</select></div>\n");
        }
    }
}

fn render_age_table(out: &mut String) {
    out.push_str(
        "<details class=\"age-info\"><summary>Age Information</summary>\
         <table><thead><tr><th>Code</th><th>Age Range</th></tr></thead><tbody>",
    );
    for age in AgeGroup::all() {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            age.code(),
            escape(age.range())
        );
    }
    out.push_str("</tbody></table></details>\n");
}

fn render_bmi_calculator(out: &mut String) {
    out.push_str(
        "<aside id=\"bmi-calculator\"><h2>BMI Calculator (KG)</h2>\
         <label for=\"height_cm\">Enter your height in cm</label>\
         <input type=\"number\" id=\"height_cm\" min=\"0\" step=\"any\" value=\"0\">\
         <label for=\"weight_kg\">Enter your weight in KG</label>\
         <input type=\"number\" id=\"weight_kg\" min=\"0\" step=\"any\" value=\"0\">\
         <button type=\"button\" id=\"calculate-bmi\">Calculate BMI</button>\
         <p id=\"bmi-result\" role=\"status\"></p></aside>\n",
    );
}

pub fn render_page() -> String {
    let mut out = String::with_capacity(8 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><link rel=\"stylesheet\" href=\"/static/style.css\">\
         </head>\n<body>\n",
        title = PAGE_TITLE
    );
    render_bmi_calculator(&mut out);

    let _ = write!(
        out,
        "<main><h1>{}</h1>\n<form id=\"indicator-form\" novalidate>\n",
        PAGE_TITLE
    );
    for control in controls() {
        if control.field == "Age" {
            render_age_table(&mut out);
        }
        render_control(&mut out, &control);
    }
    out.push_str(
        "<button type=\"submit\">Submit</button></form>\n\
         <p id=\"form-error\" class=\"error\" role=\"alert\" hidden></p>\n\
         <section id=\"prediction\" hidden><h2>Diabetes Prediction:</h2>\
         <p id=\"prediction-message\"></p></section></main>\n\
         <script src=\"/static/app.js\"></script>\n</body></html>\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferences::FEATURE_ORDER;

    #[test]
    fn one_control_per_feature() {
        let controls = controls();
        assert_eq!(controls.len(), FEATURE_ORDER.len());
        for name in FEATURE_ORDER {
            assert_eq!(
                controls.iter().filter(|c| c.field == name).count(),
                1,
                "{name}"
            );
        }
    }

    #[test]
    fn control_kinds_match_fields() {
        let controls = controls();
        let yes_no = controls
            .iter()
            .filter(|c| c.kind == ControlKind::YesNo)
            .count();
        assert_eq!(yes_no, 8);

        let bmi = controls.iter().find(|c| c.field == "BMI").unwrap();
        assert_eq!(
            bmi.kind,
            ControlKind::Slider {
                min: 18.0,
                max: 50.0,
                step: 0.1
            }
        );

        let age = controls.iter().find(|c| c.field == "Age").unwrap();
        match &age.kind {
            ControlKind::Select { options } => {
                let codes: Vec<&str> = options.iter().map(|(v, _)| v.as_str()).collect();
                assert_eq!(codes.first(), Some(&"1"));
                assert_eq!(codes.last(), Some(&"13"));
                assert_eq!(codes.len(), 13);
            }
            other => panic!("Age rendered as {other:?}"),
        }

        let gen_hlth = controls.iter().find(|c| c.field == "GenHlth").unwrap();
        match &gen_hlth.kind {
            ControlKind::Select { options } => assert_eq!(options[1].0, "Very Good"),
            other => panic!("GenHlth rendered as {other:?}"),
        }
    }

    #[test]
    fn choices_start_unselected() {
        let page = render_page();
        assert!(!page.contains(" checked"));
        assert_eq!(page.matches("type=\"radio\"").count(), 16);
        assert_eq!(page.matches("selected disabled").count(), 3);
        assert!(page.contains("min=\"18.0\" max=\"50.0\""));
    }

    #[test]
    fn page_has_both_actions_and_age_table() {
        let page = render_page();
        assert!(page.contains("<title>Diabetes Health Indicator</title>"));
        assert!(page.contains("id=\"calculate-bmi\""));
        assert!(page.contains("<button type=\"submit\">Submit</button>"));
        assert!(page.contains("<td>13</td><td>80 years old or older</td>"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
