//! Examples for using the EduRAG Server API

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";
const API_KEY: &str = "demo-key-12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Ingest a single document
    println!("2. Ingest Single Document:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/documents"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "title": "Photosynthesis",
            "content": "Photosynthesis is the process by which green plants \
                        convert light energy into chemical energy stored in glucose.",
            "subject": "science",
            "grade_level": "8",
            "language": "en-IN",
            "document_type": "textbook"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    println!("Body: {body}");
    let document_id = body["id"].as_str().unwrap_or_default().to_string();
    println!();

    // Example 3: Bulk ingest documents
    println!("3. Bulk Ingest Documents:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/documents/bulk"))
        .header("X-API-Key", API_KEY)
        .json(&json!([
            {
                "title": "The Mughal Empire",
                "content": "The Mughal Empire ruled much of the Indian subcontinent \
                            between the sixteenth and nineteenth centuries.",
                "subject": "history",
                "grade_level": "8"
            },
            {
                "title": "Linear Equations",
                "content": "A linear equation in one variable has exactly one solution.",
                "subject": "mathematics",
                "grade_level": "8"
            }
        ]))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: List documents with a subject filter
    println!("4. List Documents:");
    let resp = client
        .get(format!("{SERVER_URL}/api/v1/documents"))
        .header("X-API-Key", API_KEY)
        .query(&[("subject", "science"), ("limit", "10")])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Retrieve chunks for a question
    println!("5. Retrieve Chunks:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/retrieve"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "query": "How do plants make their food?",
            "top_k": 3,
            "filter": {
                "subject": "science",
                "grade_level": "8"
            }
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Store statistics
    println!("6. Store Statistics:");
    let resp = client
        .get(format!("{SERVER_URL}/api/v1/stats"))
        .header("X-API-Key", API_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 7: Delete the first document
    println!("7. Delete Document:");
    let resp = client
        .delete(format!("{SERVER_URL}/api/v1/documents/{document_id}"))
        .header("X-API-Key", API_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!();

    println!("All examples completed!");
    Ok(())
}
