//! Attempt-by-attempt scan tracing for problem images.
//!
//! Runs the standard plan with diagnostics enabled, falls back to the
//! exhaustive plan when nothing decodes, and prints the full attempt
//! trace plus capture quality advice for each image.
//!
//! Usage: snapcode-diagnose <image> [image ...]

use std::env;
use std::process;

use snapcode::{AttemptOutcome, AttemptPlan, Detection, Finding, ScanOptions, Scanner};

fn main() {
    env_logger::init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: snapcode-diagnose <image> [image ...]");
        process::exit(2);
    }

    let standard = Scanner::with_options(ScanOptions::default().with_diagnostics(true));
    let exhaustive = Scanner::with_options(
        ScanOptions::default()
            .with_diagnostics(true)
            .with_plan(AttemptPlan::exhaustive()),
    );

    let mut failures = 0usize;
    for path in &paths {
        println!("{}", "=".repeat(70));
        println!("Diagnosing: {}", path);
        println!("{}", "=".repeat(70));

        let image = match image::open(path) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("Cannot load {}: {}", path, err);
                failures += 1;
                continue;
            }
        };

        let quality = standard.assess_quality(&image);
        println!(
            "Quality: brightness {:.1}, stddev {:.1}, sharpness {:.1}, range {:.0}",
            quality.mean_brightness,
            quality.brightness_stddev,
            quality.sharpness,
            quality.contrast_range
        );
        for advice in &quality.recommendations {
            println!("  ! {}", advice);
        }

        let mut detection = standard.scan_image(&image);
        if !detection.found() {
            println!("\nStandard plan found nothing; trying the exhaustive plan...");
            detection = exhaustive.scan_image(&image);
        }
        print_trace(&detection);
        print_finding(&detection);
        if !detection.found() {
            failures += 1;
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn print_trace(detection: &Detection) {
    println!("\nAttempts ({}):", detection.attempts.len());
    for record in &detection.attempts {
        let outcome = match &record.outcome {
            AttemptOutcome::Decoded { codes } => format!("DECODED {} code(s)", codes.len()),
            AttemptOutcome::Empty => "empty".to_string(),
            AttemptOutcome::Failed { reason } => format!("failed: {}", reason),
            AttemptOutcome::Skipped { reason } => format!("skipped: {}", reason),
            AttemptOutcome::Hinted { hints } => format!("hinted {} region(s)", hints.len()),
        };
        println!(
            "  {:<28} {:<32} {:.2?}",
            record.name, outcome, record.elapsed
        );
    }
}

fn print_finding(detection: &Detection) {
    match &detection.finding {
        Some(Finding::Decoded(code)) => {
            println!(
                "\nDecoded via '{}': [{}] {}",
                detection.method, code.symbology, code.content
            );
            if let Some(region) = &code.region {
                println!(
                    "  region {}x{} at ({}, {})",
                    region.width, region.height, region.x, region.y
                );
            }
        }
        Some(Finding::RegionHint(hint)) => {
            println!(
                "\nRegion hint via '{}': {:?} {} (score {:.2})",
                detection.method, hint.kind, hint.label, hint.score
            );
        }
        None => println!("\nNo detection."),
    }
}
