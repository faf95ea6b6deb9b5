use std::panic;

const REDACTED: &str = "[REDACTED]";
const MAX_PAYLOAD_CHARS: usize = 160;

/// Replaces every double-quoted segment with a marker.
///
/// Message bodies reach panic payloads through `Debug` output, where they
/// are always quoted.
pub fn redact_quoted(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in input.chars() {
        if in_quotes {
            match (escaped, ch) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_quotes = false,
                _ => {}
            }
            continue;
        }

        if ch == '"' {
            in_quotes = true;
            output.push_str(REDACTED);
        } else {
            output.push(ch);
        }
    }

    output
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed: String = redact_quoted(&payload)
            .chars()
            .take(MAX_PAYLOAD_CHARS)
            .collect();

        if let Some(location) = panic_info.location() {
            eprintln!(
                "chatline panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("chatline panic: {}", scrubbed);
        }
    }));
}
