//! Document written into a detached window
//!
//! The page is a single full-viewport frame pointed at the proxied address.
//! Every interpolated value is HTML-escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedDocument<'a> {
    pub title: &'a str,
    pub icon_href: &'a str,
    pub address: &'a str,
}

impl<'a> DetachedDocument<'a> {
    pub fn new(title: &'a str, icon_href: &'a str, address: &'a str) -> Self {
        Self { title, icon_href, address }
    }

    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<title>{title}</title>
<link rel="icon" href="{icon}">
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body, html {{ width: 100%; height: 100%; overflow: hidden; background: #000; }}
iframe {{ width: 100%; height: 100%; border: none; display: block; }}
</style>
</head>
<body>
<iframe src="{src}" allowfullscreen></iframe>
</body>
</html>
"#,
            title = encode_text(self.title),
            icon = encode_double_quoted_attribute(self.icon_href),
            src = encode_double_quoted_attribute(self.address),
        )
    }
}
