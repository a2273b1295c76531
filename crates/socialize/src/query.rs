//! Query-string and URL parameters into a [`Node`].

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::percent_decode_str;
use tracing::{debug, trace};
use url::Url;

use crate::node::Node;

impl Node {
    /// Stores every `key=value` pair of a query string as a string entry.
    ///
    /// One leading `?` and then one leading `#` are ignored. Values are
    /// URL-decoded (`+` is a space); keys are stored as written. Segments
    /// without `=`, or whose value does not decode to UTF-8, are skipped.
    pub fn parse_querystring(&mut self, qs: &str) -> &mut Self {
        let qs = qs.strip_prefix('?').unwrap_or(qs);
        let qs = qs.strip_prefix('#').unwrap_or(qs);
        for segment in qs.split('&') {
            let Some((key, raw)) = segment.split_once('=') else {
                continue;
            };
            match url_decode(raw) {
                Ok(value) => {
                    self.put(key, value);
                }
                Err(err) => trace!(key, error = %err, "dropping undecodable query parameter"),
            }
        }
        self
    }

    /// Parses the query and then the fragment of `url`. A malformed URL is
    /// ignored.
    pub fn parse_url(&mut self, url: &str) -> &mut Self {
        match Url::parse(url) {
            Ok(parsed) => {
                if let Some(query) = parsed.query() {
                    self.parse_querystring(query);
                }
                if let Some(fragment) = parsed.fragment() {
                    self.parse_querystring(fragment);
                }
            }
            Err(err) => debug!(url, error = %err, "ignoring malformed url"),
        }
        self
    }
}

fn url_decode(raw: &str) -> Result<String, Utf8Error> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8().map(Cow::into_owned)
}
