//! End-to-end flow: persisted payload → loader → engine → alert rules.

use chrono::NaiveDateTime;

use prato_metrics::{compute_metrics, parse_timestamp, MetricsConfig, Weekday};
use prato_pipeline::{alert_messages, evaluate_alerts, load_orders, LoadError};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

/// A realistic export: mixed dates, an in-flight order, a broken date,
/// and a record that is not an order at all.
const SAMPLE_PAYLOAD: &str = r#"{
    "restaurante": { "nome": "Pizzaria do Zé" },
    "pedidos": [
        {
            "cliente": { "nome": "Ana Souza" },
            "valor_total": 30.0,
            "data_pedido": "2025-06-30T09:00:00",
            "dia_semana": "Segunda-feira",
            "horario_recebimento": "2025-06-30T09:00:00",
            "horario_saida": "2025-06-30T09:10:00",
            "itens": [ { "nome_produto": "Pizza Calabresa", "quantidade": 2 } ]
        },
        {
            "cliente": { "nome": "Bruno Lima" },
            "valor_total": 20.0,
            "data_pedido": "2025-06-30T10:30:00",
            "dia_semana": "Segunda-feira",
            "horario_recebimento": "2025-06-30T10:30:00",
            "horario_saida": "2025-06-30T10:35:00",
            "itens": [ { "nome_produto": "Pizza Calabresa", "quantidade": 1 } ]
        },
        {
            "cliente": { "nome": "Carla Mendes" },
            "valor_total": 25.5,
            "data_pedido": "2025-06-12T20:15:00",
            "dia_semana": "Quinta-feira",
            "horario_recebimento": "2025-06-12T20:15:00",
            "horario_saida": "2025-06-12T20:21:40",
            "itens": [ { "nome_produto": "Pizza Portuguesa", "quantidade": 1 } ]
        },
        {
            "cliente": { "nome": "Davi Rocha" },
            "valor_total": 12.0,
            "data_pedido": "quinta passada",
            "itens": [ { "nome_produto": "Esfiha Carne", "quantidade": 4 } ]
        },
        {
            "cliente": { "nome": "Elisa Prado" },
            "valor_total": 18.0,
            "data_pedido": "2025-06-30T11:00:00",
            "dia_semana": "Segunda-feira",
            "itens": [ { "nome_produto": "Pizza Portuguesa", "quantidade": 2 } ]
        },
        42
    ]
}"#;

fn now() -> NaiveDateTime {
    parse_timestamp("2025-06-30T12:00:00").unwrap()
}

#[test]
fn payload_to_metrics_to_alerts() {
    let archive = load_orders(SAMPLE_PAYLOAD).unwrap();
    assert_eq!(archive.restaurant_name, "Pizzaria do Zé");
    assert_eq!(archive.orders.len(), 5);
    assert_eq!(archive.skipped_records, 1);

    let metrics = compute_metrics(
        &archive.orders,
        &archive.restaurant_name,
        now(),
        &MetricsConfig::default(),
    );

    // Revenue counts every order, including the one with a broken date.
    assert_eq!(metrics.grand_total_sold, 105.50);

    // Prep qualifiers: Ana (600 s) and Bruno (300 s) today, Carla (400 s)
    // in the trailing window. Davi has no prep data; Elisa is in flight.
    assert_eq!(metrics.avg_prep_today_seconds, 450);
    assert_eq!(metrics.avg_prep_30d_seconds, 400);
    assert_eq!(metrics.avg_prep_seconds, 433);
    assert_eq!(metrics.weekday_prep_seconds[&Weekday::Segunda], 450);
    assert_eq!(metrics.weekday_prep_seconds[&Weekday::Quinta], 400);

    // Ranking across all orders, dates broken or not.
    let names: Vec<&str> = metrics
        .top_products
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Esfiha Carne", "Pizza Calabresa", "Pizza Portuguesa"]
    );
    assert_eq!(metrics.top_products[0].sold, 4);

    // Every product sells below the floor in this small dataset, and the
    // overall mean (433) is within 25% of the 30-day baseline (400).
    let alerts = evaluate_alerts(&metrics);
    assert_eq!(alerts.len(), 3);
    assert!(alerts.iter().all(|a| a.rule == "product_underperformance"));

    assert_eq!(metrics.skipped.unusable_order_timestamp, 1);
    assert_eq!(metrics.skipped.missing_prep_timestamp, 1);
}

#[test]
fn malformed_payload_blocks_all_downstream_computation() {
    let err = load_orders("<pedidos><pedido/></pedidos>").unwrap_err();
    assert!(matches!(err, LoadError::InvalidInputFormat(_)));
}

#[test]
fn empty_payload_produces_clean_positive_result() {
    let archive = load_orders(r#"{ "restaurante": { "nome": "Nova Casa" } }"#).unwrap();
    let metrics = compute_metrics(
        &archive.orders,
        &archive.restaurant_name,
        now(),
        &MetricsConfig::default(),
    );
    // Complete shape, all zero/empty, and no anomalies on no data.
    assert_eq!(metrics.grand_total_sold, 0.0);
    assert!(alert_messages(&metrics).is_empty());
}

#[test]
fn regression_alert_fires_on_historic_slowdown() {
    // Older orders were slow (600 s); the recent month is fast (400 s).
    // Overall mean lands far above the 30-day baseline × 1.25.
    let payload = r#"{
        "restaurante": { "nome": "Pizzaria do Zé" },
        "pedidos": [
            {
                "cliente": { "nome": "Ana" }, "valor_total": 10.0,
                "data_pedido": "2025-01-10T12:00:00",
                "horario_recebimento": "2025-01-10T12:00:00",
                "horario_saida": "2025-01-10T12:30:00",
                "itens": [ { "nome_produto": "Pizza Calabresa", "quantidade": 60 } ]
            },
            {
                "cliente": { "nome": "Bruno" }, "valor_total": 10.0,
                "data_pedido": "2025-01-11T12:00:00",
                "horario_recebimento": "2025-01-11T12:00:00",
                "horario_saida": "2025-01-11T12:30:00",
                "itens": [ { "nome_produto": "Pizza Calabresa", "quantidade": 60 } ]
            },
            {
                "cliente": { "nome": "Carla" }, "valor_total": 10.0,
                "data_pedido": "2025-06-20T12:00:00",
                "horario_recebimento": "2025-06-20T12:00:00",
                "horario_saida": "2025-06-20T12:05:00",
                "itens": [ { "nome_produto": "Pizza Calabresa", "quantidade": 60 } ]
            }
        ]
    }"#;
    let archive = load_orders(payload).unwrap();
    let metrics = compute_metrics(
        &archive.orders,
        &archive.restaurant_name,
        now(),
        &MetricsConfig::default(),
    );

    // (1800 + 1800 + 300) / 3 = 1300 overall vs 300 baseline.
    assert_eq!(metrics.avg_prep_seconds, 1300);
    assert_eq!(metrics.avg_prep_30d_seconds, 300);

    let messages = alert_messages(&metrics);
    assert_eq!(
        messages,
        vec!["Tempo médio de preparo acima da média histórica (+25%).".to_string()]
    );
}
