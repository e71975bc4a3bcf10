/// Batch cycle processor
///
/// Prepares every cycle file of a folder, writes the target path of each
/// cycle next to its raw trace and collects one results row per file.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::Writer;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::cycle_preparation::{prepare, PreparedCycle};
use crate::error::Result;
use crate::extrema::extrema_standard;

pub const RESULTS_FILENAME: &str = "preparation_results.csv";
const PATH_SUFFIX: &str = "_path";

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub original_filename: String,
    pub cycle_name: String,
    pub output_filename: String,
    pub samples: usize,
    pub duration_s: usize,
    pub distance_km: f64,
    pub path_distance_km: f64,
    pub max_speed_kmh: f64,
    pub mean_speed_kmh: f64,
    pub raw_extrema: usize,
    pub path_extrema: usize,
    pub extrema_reduction_percent: f64,
    pub idle_time_s: i64,
    pub braking_force_limit: f64,
    pub processing_status: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.processing_status == "SUCCESS"
    }

    fn failed(path: &Path, limit: f64, message: String) -> Self {
        ProcessingResult {
            original_filename: file_name_of(path),
            cycle_name: "ERROR".to_string(),
            output_filename: "ERROR".to_string(),
            samples: 0,
            duration_s: 0,
            distance_km: 0.0,
            path_distance_km: 0.0,
            max_speed_kmh: 0.0,
            mean_speed_kmh: 0.0,
            raw_extrema: 0,
            path_extrema: 0,
            extrema_reduction_percent: 0.0,
            idle_time_s: 0,
            braking_force_limit: limit,
            processing_status: format!("ERROR: {}", message),
            processed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PathRow {
    time_s: usize,
    speed_mps: f64,
    path_mps: f64,
    distance_m: f64,
}

/// Prepare all cycle files below `input_folder` and write the results into
/// `output_folder`. Files that fail are reported in the results CSV and do
/// not stop the run.
pub fn process_cycle_folder(
    input_folder: &Path,
    output_folder: &Path,
    limit: f64,
) -> Result<Vec<ProcessingResult>> {
    println!("\n🚗 DRIVING CYCLE PATH PREPARATION");
    println!("=================================");
    if limit > 0.0 {
        println!("🔧 Smoothing extrema with braking force limit {:.3}", limit);
    } else {
        println!("📈 Raw extrema (no smoothing)");
    }

    fs::create_dir_all(output_folder)?;
    println!("📁 Output folder: {}", output_folder.display());

    let cycle_files = collect_cycle_files(input_folder)?;
    println!("🔍 Found {} cycle files to process", cycle_files.len());
    println!("⚡ Using parallel processing on {} cores\n", num_cpus::get());

    let results: Vec<ProcessingResult> = cycle_files
        .par_iter()
        .map(|path| match process_single_cycle_file(path, output_folder, limit) {
            Ok(result) => {
                println!("   ✅ {}", result.original_filename);
                result
            }
            Err(e) => {
                println!("   ❌ {}: {}", path.display(), e);
                ProcessingResult::failed(path, limit, e.to_string())
            }
        })
        .collect();

    let csv_path = output_folder.join(RESULTS_FILENAME);
    save_results_to_csv(&results, &csv_path)?;
    print_processing_summary(&results);

    Ok(results)
}

/// Cycle files below `folder`, sorted, without the files this tool writes.
pub fn collect_cycle_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv && !is_generated_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_generated_file(path: &Path) -> bool {
    let file_name = file_name_of(path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    file_name == RESULTS_FILENAME || stem.ends_with(PATH_SUFFIX)
}

fn process_single_cycle_file(
    input_path: &Path,
    output_folder: &Path,
    limit: f64,
) -> Result<ProcessingResult> {
    let prepared = prepare(input_path, limit)?;

    let stem = input_path.file_stem().and_then(|s| s.to_str()).unwrap_or("cycle");
    let output_filename = format!("{}{}.csv", clean_filename(stem), PATH_SUFFIX);
    write_path_csv(&prepared, &output_folder.join(&output_filename))?;

    let summary = prepared.summary();
    let raw_extrema = extrema_standard(&prepared.cycle).len();
    let extrema_reduction_percent = if raw_extrema > 0 {
        (raw_extrema - summary.extrema_count) as f64 / raw_extrema as f64 * 100.0
    } else {
        0.0
    };

    Ok(ProcessingResult {
        original_filename: file_name_of(input_path),
        cycle_name: summary.header_name,
        output_filename,
        samples: summary.samples,
        duration_s: summary.duration_s,
        distance_km: summary.distance_km,
        path_distance_km: summary.path_distance_km,
        max_speed_kmh: summary.max_speed_kmh,
        mean_speed_kmh: summary.mean_speed_kmh,
        raw_extrema,
        path_extrema: summary.extrema_count,
        extrema_reduction_percent,
        idle_time_s: summary.idle_time_s,
        braking_force_limit: prepared.limit,
        processing_status: "SUCCESS".to_string(),
        processed_at: Utc::now(),
    })
}

/// Write one row per second: raw speed, target path speed and distance.
pub fn write_path_csv(prepared: &PreparedCycle, output_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(output_path)?;

    for (t, ((&speed, &target), &distance)) in prepared
        .cycle
        .iter()
        .zip(&prepared.path)
        .zip(&prepared.distances)
        .enumerate()
    {
        wtr.serialize(PathRow {
            time_s: t,
            speed_mps: speed,
            path_mps: target,
            distance_m: distance,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

fn save_results_to_csv(results: &[ProcessingResult], csv_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(csv_path)?;

    for result in results {
        wtr.serialize(result)?;
    }

    wtr.flush()?;
    println!("\n📊 Processing results saved to: {}", csv_path.display());
    Ok(())
}

fn print_processing_summary(results: &[ProcessingResult]) {
    let successful: Vec<_> = results.iter().filter(|r| r.is_success()).collect();
    let error_count = results.len() - successful.len();

    println!("\n🎯 PROCESSING SUMMARY");
    println!("====================");
    println!("Total files processed: {}", results.len());
    println!("✅ Successful: {}", successful.len());
    println!("❌ Errors: {}", error_count);

    if successful.is_empty() {
        return;
    }

    let count = successful.len() as f64;
    let total_distance: f64 = successful.iter().map(|r| r.distance_km).sum();
    let avg_reduction = successful.iter().map(|r| r.extrema_reduction_percent).sum::<f64>() / count;
    // -1 (no idle pair) counts as 0 s
    let avg_idle = successful.iter().map(|r| r.idle_time_s.max(0) as f64).sum::<f64>() / count;
    let avg_path_excess = average_path_excess_percent(&successful);

    println!("\n📈 PATH METRICS:");
    println!("Total cycle distance: {:.2} km", total_distance);
    println!("Average extrema reduction: {:.1}%", avg_reduction);
    println!("Average path distance excess: {:+.1}%", avg_path_excess);
    println!("Average idle time (cycles without idle as 0 s): {:.0} s", avg_idle);
}

/// Mean excess of path distance over cycle distance, over cycles that moved.
fn average_path_excess_percent(results: &[&ProcessingResult]) -> f64 {
    let excesses: Vec<f64> = results
        .iter()
        .filter(|r| r.distance_km > 0.0)
        .map(|r| (r.path_distance_km / r.distance_km - 1.0) * 100.0)
        .collect();

    if excesses.is_empty() {
        return 0.0;
    }
    excesses.iter().sum::<f64>() / excesses.len() as f64
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn clean_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
