use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use icc_core::data::RatingMatrix;
use icc_core::icc::{estimate, IccConfig, IccResult, IccType};
use icc_core::variance::{decompose, MeanSquares};

#[derive(Parser)]
#[command(name = "openicc")]
#[command(version)]
#[command(about = "Intraclass correlation (consistency ICC) for rater agreement studies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one ICC variant with its F test and confidence interval
    Compute {
        #[command(flatten)]
        input: InputArgs,

        /// ICC variant: "C-k" (average of k raters, default) or "C-1" (single rater)
        #[arg(short = 't', long = "type", default_value = "C-k")]
        icc_type: String,

        #[command(flatten)]
        inference: InferenceArgs,

        /// Also print the two-way ANOVA table
        #[arg(long)]
        anova: bool,
    },

    /// Compute both consistency variants on the same data
    Both {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        inference: InferenceArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to ratings CSV file
    #[arg(short, long)]
    data: String,

    /// Column holding subject IDs (wide format); needed when the IDs are numeric
    #[arg(long)]
    subject_column: Option<String>,

    /// Read long format (one measurement per row) instead of subjects x raters
    #[arg(long)]
    long: bool,

    /// Subject column name (long format)
    #[arg(long, default_value = "subject")]
    subject: String,

    /// Rater column name (long format)
    #[arg(long, default_value = "rater")]
    rater: String,

    /// Score column name (long format)
    #[arg(long, default_value = "score")]
    score: String,
}

#[derive(Args)]
struct InferenceArgs {
    /// Significance level; the interval has coverage 1 - alpha
    #[arg(long, default_value = "0.05")]
    alpha: f64,

    /// ICC value under the null hypothesis
    #[arg(long, default_value = "0")]
    r0: f64,

    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            input,
            icc_type,
            inference,
            anova,
        } => {
            let icc_type: IccType = icc_type
                .parse()
                .with_context(|| format!("Invalid --type '{}'", icc_type))?;
            cmd_compute(&input, &[icc_type], &inference, anova)
        }
        Commands::Both { input, inference } => {
            cmd_compute(&input, &IccType::ALL, &inference, false)
        }
    }
}

fn load_ratings(input: &InputArgs) -> Result<RatingMatrix> {
    let ratings = if input.long {
        RatingMatrix::from_long_csv(&input.data, &input.subject, &input.rater, &input.score)
    } else if let Some(subject_column) = &input.subject_column {
        RatingMatrix::from_csv_with_subject_column(&input.data, subject_column)
    } else {
        RatingMatrix::from_csv(&input.data)
    }
    .with_context(|| format!("Failed to load ratings from '{}'", input.data))?;

    log::info!(
        "Loaded {} subjects x {} raters from '{}'",
        ratings.n_subjects(),
        ratings.n_raters(),
        input.data
    );
    Ok(ratings)
}

fn cmd_compute(
    input: &InputArgs,
    icc_types: &[IccType],
    inference: &InferenceArgs,
    show_anova: bool,
) -> Result<()> {
    let output_format = inference.format.to_lowercase();
    if output_format != "text" && output_format != "json" {
        anyhow::bail!(
            "Unknown format '{}'. Use 'text' (default) or 'json'.",
            inference.format
        );
    }

    let ratings = load_ratings(input)?;
    let ms = decompose(&ratings).context("Variance decomposition failed")?;

    let mut results = Vec::with_capacity(icc_types.len());
    for &icc_type in icc_types {
        let config = IccConfig::new()
            .icc_type(icc_type)
            .alpha(inference.alpha)
            .r0(inference.r0);
        let result = estimate(&ms, &config)
            .with_context(|| format!("ICC({}) computation failed", icc_type))?;
        results.push((config, result));
    }

    match output_format.as_str() {
        "json" => print_json(&ratings, &ms, &results, show_anova)?,
        _ => print_text(&ms, &results, show_anova),
    }

    Ok(())
}

fn print_text(ms: &MeanSquares, results: &[(IccConfig, IccResult)], show_anova: bool) {
    if show_anova {
        println!("{}", ms.anova_table());
    }
    for (config, result) in results {
        println!("{}", result.summary(config));
    }
}

fn print_json(
    ratings: &RatingMatrix,
    ms: &MeanSquares,
    results: &[(IccConfig, IccResult)],
    show_anova: bool,
) -> Result<()> {
    let mut map = serde_json::Map::new();

    map.insert(
        "n_subjects".to_string(),
        serde_json::json!(ratings.n_subjects()),
    );
    map.insert("n_raters".to_string(), serde_json::json!(ratings.n_raters()));
    map.insert("raters".to_string(), serde_json::json!(ratings.rater_labels()));

    if show_anova {
        map.insert("anova".to_string(), serde_json::to_value(ms)?);
    }

    let icc: Vec<serde_json::Value> = results
        .iter()
        .map(|(config, result)| {
            serde_json::json!({
                "icc_type": config.icc_type,
                "alpha": config.alpha,
                "r0": config.r0,
                "result": result,
            })
        })
        .collect();
    map.insert("icc".to_string(), serde_json::json!(icc));

    let json_str = serde_json::to_string_pretty(&serde_json::Value::Object(map))?;
    println!("{}", json_str);
    Ok(())
}
