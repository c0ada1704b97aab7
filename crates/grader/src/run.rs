use anyhow::{Context, Result};

use grader_core::{
    report, GraderConfig, GradingPipeline, NameReconciler, QuestionSet, Roster, RosterError,
    ScoreEvaluator, SubmissionSource, Toolchain,
};

use crate::cli::GradeArgs;

pub async fn run(cli: GradeArgs) -> Result<()> {
    let config = load_config(&cli).await?;

    let questions = QuestionSet::load(&cli.questions)
        .await
        .context("cannot grade without a question list")?;
    if questions.is_empty() {
        tracing::warn!(path = %cli.questions.display(), "Question list has no questions, every score will be 0");
    }

    let toolchain = Toolchain::discover(&config.tools)?;
    let source = SubmissionSource::open(&cli.submissions)
        .await
        .with_context(|| format!("cannot open submissions at {}", cli.submissions.display()))?;

    let pipeline = GradingPipeline::new(
        toolchain.extractor(&config.ocr),
        ScoreEvaluator::new(questions),
    );
    let batch = pipeline.grade_source(&source).await?;

    report::save_scores(&cli.output, &batch.records).await?;
    batch.stats.log_summary();

    let roster = match Roster::load(&cli.names).await {
        Ok(roster) => roster,
        Err(RosterError::NotFound(path)) => {
            tracing::warn!(path = %path, "Roster not found, will not generate paired scores");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let paired = NameReconciler::default().reconcile(&batch.records, &roster);
    let missing = paired.iter().filter(|p| p.is_missing()).count();
    let orphans = paired.iter().filter(|p| p.is_orphan()).count();
    tracing::info!(
        roster = roster.len(),
        missing,
        orphans,
        "Paired scores with roster"
    );
    report::save_paired(&cli.paired_output, &paired).await?;

    Ok(())
}

/// Defaults, then the config file, then `GRADER_*` variables, then flags.
async fn load_config(cli: &GradeArgs) -> Result<GraderConfig> {
    let config = match &cli.config {
        Some(path) => GraderConfig::load(path).await?,
        None => GraderConfig::default(),
    };
    Ok(cli.apply(config.with_env()))
}
