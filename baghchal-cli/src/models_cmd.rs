//! Models command - OpenRouter catalogue and prices

use anyhow::{Context, Result};
use clap::Args;

use baghchal_core::ModelListing;

use crate::arena::ArenaArgs;

#[derive(Args)]
pub struct ModelsArgs {
    /// Show a price table for these models instead of the full listing
    #[arg(long, num_args = 1.., value_name = "MODEL")]
    pub prices: Vec<String>,

    /// Only list free models
    #[arg(long, conflicts_with = "prices")]
    pub free: bool,
}

pub fn run(args: ModelsArgs, arena: &ArenaArgs) -> Result<()> {
    let client = arena.openrouter()?;
    let models = client.list_models().context("Failed to fetch model list")?;

    if args.prices.is_empty() {
        print_listing(&models, args.free);
    } else {
        print_prices(&models, &args.prices);
    }
    Ok(())
}

fn print_listing(models: &[ModelListing], free_only: bool) {
    let mut shown = 0;
    for model in models {
        let free = model.pricing.is_free();
        if free_only && !free {
            continue;
        }
        println!("[{}] {}", if free { "FREE" } else { "PAID" }, model.id);
        shown += 1;
    }
    println!("\n{} models", shown);
}

fn print_prices(models: &[ModelListing], wanted: &[String]) {
    println!(
        "{:<50} {:>14} {:>14} {:>10} {:>10}",
        "Model", "Prompt $/M", "Output $/M", "Image", "Request"
    );
    for id in wanted {
        let Some(model) = models.iter().find(|m| &m.id == id) else {
            tracing::warn!("Model not found: {}", id);
            continue;
        };
        let pricing = &model.pricing;
        println!(
            "{:<50} {:>14} {:>14} {:>10} {:>10}",
            model.id,
            price(pricing.prompt_per_million()),
            price(pricing.completion_per_million()),
            price(pricing.image()),
            price(pricing.request())
        );
    }
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}
