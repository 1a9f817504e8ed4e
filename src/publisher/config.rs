use super::{SinkKind, SinkOptions};

pub fn parse_sink_kind(s: &str) -> Option<SinkKind> {
    match s.to_lowercase().as_str() {
        "stdout" | "console" => Some(SinkKind::Stdout),
        "file" => Some(SinkKind::File),
        "discard" | "null" => Some(SinkKind::Discard),
        _ => None,
    }
}

/// Parse `key=value` pairs; entries without `=` are ignored
pub fn parse_sink_kv(pairs: &[String]) -> SinkOptions {
    let mut opts = SinkOptions::default();
    for p in pairs {
        if let Some((k, v)) = p.split_once('=') {
            opts.params.insert(k.to_string(), v.to_string());
        }
    }
    opts
}
