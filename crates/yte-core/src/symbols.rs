// Inline control codes used by game/message text (`\n[1]`, `\c[4]`, `<br>`, ...),
// split out so the views can color them.
use once_cell::sync::Lazy;
use regex::Regex;

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\\(?:aub|kel|her|Com|SINV|sinv)(?:\[[0-9]+\]|[0-9]*[^\s\\]*)",
        r"|\\(?:n|c|mar)(?:\[[0-9]+\]|[0-9]*)?",
        r"|\\!",
        r"|<br>",
        r"|\\\{",
        r"|\\\}",
        r"|\\\\",
        r"|<>",
        r"|\\",
    ))
    .expect("symbol pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub symbol: bool,
}

/// Splits `text` into alternating plain/symbol spans covering it completely.
pub fn spans(text: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in SYMBOL_RE.find_iter(text) {
        if m.start() > last {
            out.push(Span {
                text: &text[last..m.start()],
                symbol: false,
            });
        }
        out.push(Span {
            text: m.as_str(),
            symbol: true,
        });
        last = m.end();
    }
    if last < text.len() {
        out.push(Span {
            text: &text[last..],
            symbol: false,
        });
    }
    out
}
