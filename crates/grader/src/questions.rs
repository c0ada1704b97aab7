use std::path::Path;

use anyhow::{Context, Result};

use grader_core::QuestionSet;

/// Expand a shorthand listing and append the result to the question list.
pub async fn run(listing: &Path, output: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(listing)
        .await
        .with_context(|| format!("cannot read listing {}", listing.display()))?;
    let questions = QuestionSet::from_shorthand(&raw)?;

    for question in questions.iter() {
        println!("{question}");
    }
    questions.append_to(output).await?;

    tracing::info!(
        count = questions.len(),
        path = %output.display(),
        "Appended questions"
    );
    Ok(())
}
