//! Turns the price strings Steam returns ("1 234,56 pуб.", "$1,234.56",
//! "12,50€", ...) into plain numbers.

use std::sync::OnceLock;

use regex::Regex;

fn price_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `\s` covers the non-breaking spaces Steam puts between thousands groups
    RE.get_or_init(|| Regex::new(r"\d(?:[\d.,\s]*\d)?").expect("price regex"))
}

/// Returns `None` when the input holds no number.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let run = price_run().find(raw)?.as_str();

    let mut s: String = run.chars().filter(|c| !c.is_whitespace()).collect();

    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            s = s.replace(thousands, "");
            if decimal == ',' {
                s = s.replace(',', ".");
            }
        }
        (Some(_), None) => s = single_separator(&s, '.'),
        (None, Some(_)) => s = single_separator(&s, ','),
        (None, None) => {}
    }

    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// With only one kind of separator it is decimal when it shows up once and is
// followed by at most two digits; anything else is thousands grouping.
fn single_separator(s: &str, sep: char) -> String {
    let count = s.matches(sep).count();
    let digits_after = s.rsplit(sep).next().map(str::len).unwrap_or(0);

    if count == 1 && digits_after <= 2 {
        s.replace(sep, ".")
    } else {
        s.replace(sep, "")
    }
}
