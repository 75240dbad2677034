use std::env;
use std::process;
use std::time::Instant;

use chrono::{Local, NaiveDateTime, Utc};
use serde::Serialize;

use prato_bridge::{generate_report, GeminiChatService, GeminiConfig, ReportDocument, ReportRequest};
use prato_metrics::{compute_metrics, parse_timestamp, AggregatedMetrics, MetricsConfig};
use prato_pipeline::{alert_messages, load_orders_file, OrderArchive};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson {
    generated_at: String,
    /// Evaluation instant the rolling windows were computed against.
    evaluated_at: String,
    metrics: AggregatedMetrics,
    alerts: Vec<String>,
    summary: SummaryJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ReportDocument>,
}

#[derive(Serialize)]
struct SummaryJson {
    orders_processed: usize,
    records_skipped_on_load: usize,
    soft_skips: usize,
    alerts_fired: usize,
    load_ms: u128,
    compute_ms: u128,
}

fn build_json(
    metrics: AggregatedMetrics,
    alerts: Vec<String>,
    archive: &OrderArchive,
    now: NaiveDateTime,
    report: Option<ReportDocument>,
    load_ms: u128,
    compute_ms: u128,
) -> DigestJson {
    DigestJson {
        generated_at: Utc::now().to_rfc3339(),
        evaluated_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        summary: SummaryJson {
            orders_processed: archive.orders.len(),
            records_skipped_on_load: archive.skipped_records,
            soft_skips: metrics.skipped.total(),
            alerts_fired: alerts.len(),
            load_ms,
            compute_ms,
        },
        metrics,
        alerts,
        report,
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn minutes(seconds: u64) -> f64 {
    (seconds as f64 / 60.0 * 10.0).round() / 10.0
}

fn print_human(metrics: &AggregatedMetrics, alerts: &[String], archive: &OrderArchive) {
    let name = if metrics.restaurant_name.is_empty() {
        "(sem nome)"
    } else {
        metrics.restaurant_name.as_str()
    };

    println!();
    println!("  {:═<62}", "");
    println!("  PRATO \u{2014} Análise de Restaurante: {}", name);
    println!("  {:═<62}", "");
    println!();
    println!(
        "  {} pedidos processados  \u{00b7}  {} registros ignorados  \u{00b7}  {} ajustes de qualidade",
        archive.orders.len(),
        archive.skipped_records,
        metrics.skipped.total()
    );
    println!();
    println!("  Valor total vendido: R$ {:.2}", metrics.grand_total_sold);
    println!();
    println!("  Tempo de preparo:");
    println!(
        "    Hoje:             {:.1} min ({}s)",
        minutes(metrics.avg_prep_today_seconds),
        metrics.avg_prep_today_seconds
    );
    println!(
        "    Últimos 30 dias:  {:.1} min ({}s)",
        minutes(metrics.avg_prep_30d_seconds),
        metrics.avg_prep_30d_seconds
    );
    println!(
        "    Geral:            {:.1} min ({}s)",
        minutes(metrics.avg_prep_seconds),
        metrics.avg_prep_seconds
    );
    println!();

    if metrics.top_products.is_empty() {
        println!("  Nenhum produto vendido no período.");
    } else {
        println!("  Mais vendidos:");
        for (i, product) in metrics.top_products.iter().enumerate() {
            println!("    {}. {} \u{2014} {} unidades", i + 1, product.name, product.sold);
        }
    }
    println!();

    if alerts.is_empty() {
        println!("  Nenhuma anomalia detectada. Tudo certo!");
    } else {
        println!("  Alertas:");
        for alert in alerts {
            println!("    ! {alert}");
        }
    }
    println!();
}

fn print_report(document: &ReportDocument) {
    println!("  {:─<62}", "");
    println!("  {}", document.title);
    println!();
    println!("  {}", document.summary);
    if !document.recommendations.is_empty() {
        println!();
        println!("  Recomendações:");
        for rec in &document.recommendations {
            println!("    - {rec}");
        }
    }
    println!("  {:─<62}", "");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!("Usage: prato-server <pedidos.json> [--now <timestamp>] [--json] [--report]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --now      Evaluation instant for the rolling windows");
    eprintln!("             (ISO-8601, e.g. 2025-06-30T12:00:00; default: current local time)");
    eprintln!("  --json     Output the full digest as JSON instead of formatted text");
    eprintln!("  --report   Also request an AI narrative report (needs GEMINI_API_KEY)");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  prato-server fixtures/pedidos_sample.json");
    eprintln!("  prato-server fixtures/pedidos_sample.json --now 2025-06-30T12:00:00 --json");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let payload_path = &args[1];

    let mut now: Option<NaiveDateTime> = None;
    let mut json_output = false;
    let mut with_report = false;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--now" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --now requires a timestamp");
                    process::exit(1);
                }
                now = match parse_timestamp(&args[i + 1]) {
                    Some(dt) => Some(dt),
                    None => {
                        eprintln!("Error: could not parse --now value '{}'", args[i + 1]);
                        process::exit(1);
                    }
                };
                i += 2;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--report" => {
                with_report = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                usage();
            }
        }
    }
    let now = now.unwrap_or_else(|| Local::now().naive_local());

    let load_start = Instant::now();
    let archive = match load_orders_file(payload_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error loading orders: {e}");
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();

    let compute_start = Instant::now();
    let metrics = compute_metrics(
        &archive.orders,
        &archive.restaurant_name,
        now,
        &MetricsConfig::default(),
    );
    let alerts = alert_messages(&metrics);
    let compute_ms = compute_start.elapsed().as_millis();

    log::info!(
        "computed metrics for {} orders in {}ms ({} soft skips)",
        archive.orders.len(),
        compute_ms,
        metrics.skipped.total()
    );

    let report = if with_report {
        match request_report(&metrics, &alerts).await {
            Ok(document) => Some(document),
            Err(e) => {
                eprintln!("Error generating report: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    if json_output {
        let digest = build_json(metrics, alerts, &archive, now, report, load_ms, compute_ms);
        match serde_json::to_string_pretty(&digest) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("Error serializing digest: {e}");
                process::exit(1);
            }
        }
    } else {
        print_human(&metrics, &alerts, &archive);
        if let Some(ref document) = report {
            print_report(document);
        }
    }
}

async fn request_report(
    metrics: &AggregatedMetrics,
    alerts: &[String],
) -> Result<ReportDocument, prato_bridge::BridgeError> {
    let config = GeminiConfig::from_env()?;
    let service = GeminiChatService::new(config)?;
    let request = ReportRequest {
        restaurant_name: metrics.restaurant_name.clone(),
        top_products: metrics
            .top_products
            .iter()
            .map(|p| prato_bridge::protocol::ProductEntry {
                name: p.name.clone(),
                sold: p.sold,
            })
            .collect(),
        avg_prep_seconds: metrics.avg_prep_seconds,
        avg_prep_today_seconds: metrics.avg_prep_today_seconds,
        avg_prep_30d_seconds: metrics.avg_prep_30d_seconds,
        alerts: alerts.to_vec(),
    };
    generate_report(&service, &request).await
}
