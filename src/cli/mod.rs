use anyhow::Result;
use serde::Serialize;

use crate::services::PredictionService;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn show_competitions(service: &PredictionService) -> Result<()> {
    println!("🏆 Fetching top league competitions...");
    let competitions = service.top_competitions().await?;
    print_json(&competitions)
}

pub async fn show_upcoming(service: &PredictionService, competition: &str) -> Result<()> {
    println!("📅 Fetching matches for competition {}...", competition);
    let matches = service.upcoming_matches(competition).await?;
    println!("✅ {} matches found", matches.len());
    print_json(&matches)
}

pub async fn predict(service: &PredictionService, competition: &str, team_a: &str, team_b: &str) -> Result<()> {
    println!("🔮 Predicting {} vs {} ({})...", team_a, team_b, competition);
    let report = service.predict(competition, team_a, team_b).await?;

    println!("\n🎯 {}", report.prediction);
    println!("   Confidence: {}", report.confidence_score);
    println!("   Head-to-head matches: {}\n", report.head_to_head.len());
    print_json(&report.betting_odds)
}
