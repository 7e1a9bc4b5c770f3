use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use csmp_core::config::{AnnotateConfig, EncoderConfig};
use csmp_core::error::EncodeError;
use csmp_core::traits::SpectrumEncoder;
use csmp_core::types::{FailureReason, Peak, SpectrumBatch, SpectrumRecord, EMBEDDING_DIM};
use csmp_encode::tensor::build_batch_tensors;
use csmp_encode::{FakeSpectrumEncoder, RemoteSpectrumEncoder};

fn record(index: usize, peaks: &[(f64, f64)]) -> SpectrumRecord {
    SpectrumRecord {
        index,
        precursor_mz: Some(200.0),
        adduct: None,
        formula: None,
        peaks: peaks.iter().map(|&(mz, intensity)| Peak { mz, intensity }).collect(),
    }
}

fn batch(records: Vec<SpectrumRecord>) -> SpectrumBatch {
    SpectrumBatch { batch_id: Uuid::new_v4(), records }
}

/// Minimal one-shot HTTP server: serves the canned responses in order, one
/// connection each, then goes away.
async fn spawn_encoder_stub(responses: Vec<(u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            drain_request(&mut socket).await;
            let reason = match status {
                200 => "OK",
                400 => "Bad Request",
                503 => "Service Unavailable",
                _ => "Unknown",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}/encode")
}

async fn drain_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]);
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

fn remote_encoder(url: String) -> RemoteSpectrumEncoder {
    let annotate =
        AnnotateConfig { max_retries: 3, retry_backoff_ms: 1, ..AnnotateConfig::default() };
    RemoteSpectrumEncoder::new(EncoderConfig { url, max_peaks: 8 }, &annotate).expect("client")
}

fn one_vector_body(dim: usize) -> String {
    let mut v = vec![0f32; dim];
    v[0] = 3.0;
    v[1] = 4.0;
    serde_json::json!({ "items": [{ "vector": v }] }).to_string()
}

#[tokio::test]
async fn fake_encoder_shapes_and_determinism() {
    let encoder = FakeSpectrumEncoder::default();
    let peaks = [(100.1, 5.0), (120.2, 2.0), (130.3, 1.0)];
    let b = batch(vec![record(0, &peaks), record(1, &peaks)]);

    let result = encoder.encode_batch(&b).await.expect("encode");
    assert_eq!(result.batch_id, b.batch_id);
    assert_eq!(result.items.len(), 2, "every submitted index is covered");

    let v1 = result.items[0].outcome.as_ref().expect("vector");
    let v2 = result.items[1].outcome.as_ref().expect("vector");
    assert_eq!(v1.len(), EMBEDDING_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Same peaks, same vector.
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[tokio::test]
async fn fake_encoder_differs_for_different_spectra() {
    let encoder = FakeSpectrumEncoder::default();
    let b = batch(vec![
        record(0, &[(100.1, 5.0), (120.2, 2.0)]),
        record(1, &[(350.7, 1.0), (411.9, 9.0)]),
    ]);
    let result = encoder.encode_batch(&b).await.expect("encode");
    let v1 = result.items[0].outcome.as_ref().expect("vector");
    let v2 = result.items[1].outcome.as_ref().expect("vector");
    assert!(v1.iter().zip(v2.iter()).any(|(a, b)| (a - b).abs() > 1e-6));
}

#[tokio::test]
async fn fake_encoder_marks_empty_rows_as_item_failures() {
    let encoder = FakeSpectrumEncoder::default();
    let b = batch(vec![record(0, &[(100.1, 5.0)]), record(1, &[])]);
    let result = encoder.encode_batch(&b).await.expect("encode");

    assert!(result.items[0].outcome.is_ok());
    assert_eq!(result.items[1].outcome.as_ref().unwrap_err(), &FailureReason::EmbeddingFailed);
    assert_eq!(result.items[1].spectrum_index, 1, "failed item keeps its index");
}

#[tokio::test]
async fn remote_encoder_retries_transient_failures_then_succeeds() {
    let url = spawn_encoder_stub(vec![
        (503, String::new()),
        (200, one_vector_body(EMBEDDING_DIM)),
    ])
    .await;
    let encoder = remote_encoder(url);
    let b = batch(vec![record(0, &[(100.1, 5.0)])]);

    let result = encoder.encode_batch(&b).await.expect("recovers on retry");
    assert_eq!(result.items.len(), 1);
    let v = result.items[0].outcome.as_ref().expect("vector");
    // 3-4-5 input comes back L2-normalized.
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn remote_encoder_does_not_retry_rejections() {
    // A single canned 400: a retry would hit a dead listener and surface as
    // a transport error instead.
    let url = spawn_encoder_stub(vec![(400, String::new())]).await;
    let encoder = remote_encoder(url);
    let b = batch(vec![record(0, &[(100.1, 5.0)])]);

    let err = encoder.encode_batch(&b).await.unwrap_err();
    assert!(matches!(err, EncodeError::Rejected(_)), "got {err}");
}

#[tokio::test]
async fn remote_encoder_rejects_item_count_mismatch() {
    let url = spawn_encoder_stub(vec![(200, r#"{"items":[]}"#.to_string())]).await;
    let encoder = remote_encoder(url);
    let b = batch(vec![record(0, &[(100.1, 5.0)])]);

    let err = encoder.encode_batch(&b).await.unwrap_err();
    assert!(matches!(err, EncodeError::Rejected(_)), "got {err}");
}

#[tokio::test]
async fn remote_encoder_fails_items_with_wrong_dimension() {
    let url = spawn_encoder_stub(vec![(
        200,
        serde_json::json!({ "items": [{ "vector": [1.0, 2.0, 3.0] }] }).to_string(),
    )])
    .await;
    let encoder = remote_encoder(url);
    let b = batch(vec![record(0, &[(100.1, 5.0)])]);

    let result = encoder.encode_batch(&b).await.expect("call itself succeeds");
    assert_eq!(result.items[0].outcome.as_ref().unwrap_err(), &FailureReason::EmbeddingFailed);
}

#[test]
fn tensors_are_padded_and_truncated_to_fixed_shape() {
    let records = vec![
        record(0, &[(100.0, 1.0), (101.0, 2.0)]),
        record(1, &[(50.0, 1.0), (51.0, 1.0), (52.0, 1.0), (53.0, 1.0)]),
    ];
    let tensors = build_batch_tensors(&records, 3);

    assert_eq!(tensors.mzs.len(), 2);
    assert_eq!(tensors.mzs[0].len(), 3, "rows are padded to max_peaks");
    assert_eq!(tensors.mzs[1].len(), 3, "rows are truncated to max_peaks");
    assert_eq!(tensors.num_peaks, vec![2, 3]);

    assert_eq!(tensors.mzs[0], vec![100.0, 101.0, 0.0]);
    assert_eq!(tensors.intensities[0], vec![1.0, 2.0, 0.0]);
    assert_eq!(tensors.mzs[1], vec![50.0, 51.0, 52.0]);
}
