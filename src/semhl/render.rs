//! HTML rendering of a per-character classification
//!
//! Debug output for eyeballing a classification. Consecutive characters of the same
//! color share one span; unclassified and ANY characters are left unstyled.
//!
//! ```text
//! <pre><span style="color:#cc7832">int</span> <span style="color:#9876aa">x</span> = 1;</pre>
//! ```

use super::projection::HCharSeq;

/// Renders `source` colored by `chars`. Characters past the end of `chars` are unstyled.
pub fn to_html(source: &str, chars: &HCharSeq) -> String {
    let mut output = String::from("<pre>");
    let mut run = String::new();
    let mut run_color: Option<&'static str> = None;

    for (index, c) in source.chars().enumerate() {
        let color = chars.get(index).and_then(|hcode| hcode.color());
        if color != run_color && !run.is_empty() {
            push_run(&mut output, &run, run_color);
            run.clear();
        }
        run_color = color;
        run.push(c);
    }
    if !run.is_empty() {
        push_run(&mut output, &run, run_color);
    }

    output.push_str("</pre>");
    output
}

fn push_run(output: &mut String, text: &str, color: Option<&str>) {
    match color {
        Some(color) => {
            output.push_str(&format!("<span style=\"color:{}\">", color));
            output.push_str(&escape_html(text));
            output.push_str("</span>");
        }
        None => output.push_str(&escape_html(text)),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::hcode::HCode;

    #[test]
    fn test_runs_share_a_span() {
        let chars = HCharSeq::from_cells(vec![
            Some(HCode::Keyword),
            Some(HCode::Keyword),
            None,
            Some(HCode::Any),
        ]);
        assert_eq!(
            to_html("do x", &chars),
            "<pre><span style=\"color:#cc7832\">do</span> x</pre>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let chars = HCharSeq::from_cells(vec![Some(HCode::CharStringLiteral); 5]);
        assert_eq!(
            to_html("\"<&>\"", &chars),
            "<pre><span style=\"color:#6a8759\">&quot;&lt;&amp;&gt;&quot;</span></pre>"
        );
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(to_html("", &HCharSeq::from_cells(Vec::new())), "<pre></pre>");
    }
}
