/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn error(&self, message: &str);
    /// Print a record's properties; `value` is expected to be a JSON object
    fn print_record(&self, value: &serde_json::Value);
}

/// Human-readable output: one aligned `name: value` line per property
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
    fn print_record(&self, value: &serde_json::Value) {
        for line in property_lines(value) {
            println!("{}", line);
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn print_record(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Renders the properties of a JSON object sorted by name, with the names
/// padded to the longest one so the colons line up. `null` renders as an
/// empty value; trailing whitespace is trimmed.
pub fn property_lines(value: &serde_json::Value) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return vec![value.to_string()];
    };

    let mut properties: Vec<(&String, &serde_json::Value)> = object.iter().collect();
    properties.sort_by(|a, b| a.0.cmp(b.0));

    let width = properties.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    properties
        .into_iter()
        .map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{:<width$}: {}", key, rendered, width = width)
                .trim_end()
                .to_string()
        })
        .collect()
}
