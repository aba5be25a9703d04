use formulab_core::formula::GenerateResult;
use formulab_core::recovery::{extract_json_like, recover};

use crate::util::{print_json, read_text};

/// Run recovery and categorization over saved agent output.
/// Exit code 0 when a value was recovered, 1 otherwise, 4 on input errors.
pub fn run(path: &str) -> i32 {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(message) => {
            print_json(
                &serde_json::json!({"error": "cli_error", "message": message}),
                false,
            );
            return 4;
        }
    };

    let result = recover_text(&text);
    let parsed = result.parsed;
    match render(&text, &result) {
        Ok(value) => print_json(&value, parsed),
        Err(e) => {
            eprintln!("failed to render result: {e}");
            return 2;
        }
    }

    if parsed { 0 } else { 1 }
}

/// The result as JSON. Failures also carry the `candidate` substring the
/// ladder worked on, to show where the reply stopped being JSON.
fn render(text: &str, result: &GenerateResult) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(result)?;
    if !result.parsed {
        value["candidate"] = serde_json::Value::String(extract_json_like(text));
    }
    Ok(value)
}

fn recover_text(text: &str) -> GenerateResult {
    GenerateResult::from(recover(text)).with_formatted_data()
}
