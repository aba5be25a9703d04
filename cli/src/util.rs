use std::io::Read;

use serde_json::json;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    print_json(&err, false);
    std::process::exit(4);
}

/// Pretty-print JSON to stdout on success, stderr otherwise.
pub fn print_json(value: &serde_json::Value, success: bool) {
    let formatted = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if success {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }
}

/// Execute an API request, print the response, return a structured exit code.
///
/// Exit codes: 0=success, 1=client error (4xx) or envelope with `ok: false`,
///             2=server error (5xx), 3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> i32 {
    let url = match reqwest::Url::parse(&format!("{api_url}{path}")) {
        Ok(u) => u,
        Err(e) => {
            print_json(
                &json!({
                    "error": "cli_error",
                    "message": format!("Invalid URL: {api_url}{path}: {e}")
                }),
                false,
            );
            return 4;
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            print_json(
                &json!({
                    "error": "connection_error",
                    "message": format!("{e}"),
                    "docs_hint": "Is the API server running? Check FORMULAB_API_URL."
                }),
                false,
            );
            return 3;
        }
    };

    let status = resp.status().as_u16();
    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    let exit_code = exit_code_for(status, &resp_body);
    print_json(&resp_body, exit_code == 0);
    exit_code
}

/// The API answers generate failures with 200 and `ok: false`, so the
/// envelope decides as much as the status does.
fn exit_code_for(status: u16, body: &serde_json::Value) -> i32 {
    match status {
        200..=299 if body.get("ok") == Some(&serde_json::Value::Bool(false)) => 1,
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Read text from a file path or stdin (when path is "-").
pub fn read_text(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))
}
