use serde_json::json;

use crate::util::{api_request, exit_error};

pub async fn run(api_url: &str, message: &str, save_file: bool) -> i32 {
    if message.trim().is_empty() {
        exit_error(
            "--message must not be empty",
            Some("Describe the product you want, e.g. --message \"SPF 30 day cream\""),
        );
    }

    let body = json!({
        "message": message,
        "save_file": save_file,
    });
    api_request(api_url, reqwest::Method::POST, "/generate", Some(body)).await
}
