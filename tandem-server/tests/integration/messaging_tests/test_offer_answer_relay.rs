use tandem_core::{SessionDescription, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TestClient, TestServer, joined};

#[tokio::test]
async fn test_offer_answer_relay() {
    init_tracing();
    let server = TestServer::start().await;
    let url = server.ws_url();

    let mut x = TestClient::connect(&url).await.unwrap();
    let mut y = TestClient::connect(&url).await.unwrap();
    assert_eq!(x.join("r1").await.unwrap(), joined("r1", 1));
    assert_eq!(y.join("r1").await.unwrap(), joined("r1", 2));
    assert_eq!(y.recv().await.unwrap(), SignalMessage::Ready);
    x.expect_silence().await.expect("First member never gets ready");

    let offer = SignalMessage::Offer {
        sdp: SessionDescription::offer("v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n"),
    };
    y.send(&offer).await.unwrap();
    assert_eq!(x.recv().await.unwrap(), offer);
    y.expect_silence().await.expect("Offer is not echoed");

    let answer = SignalMessage::Answer {
        sdp: SessionDescription::answer("v=0\r\no=- 2 2 IN IP4 0.0.0.0\r\n"),
    };
    x.send(&answer).await.unwrap();
    assert_eq!(y.recv().await.unwrap(), answer);
    x.expect_silence().await.expect("Answer is not echoed");
}

#[tokio::test]
async fn test_relay_keeps_payload_fields() {
    init_tracing();
    let server = TestServer::start().await;
    let url = server.ws_url();

    let mut x = TestClient::connect(&url).await.unwrap();
    let mut y = TestClient::connect(&url).await.unwrap();
    x.join("r1").await.unwrap();
    y.join("r1").await.unwrap();
    y.recv().await.unwrap();

    y.send_raw(r#"{"type":"offer","sdp":{"type":"offer","sdp":"v=0\r\na=group:BUNDLE 0\r\n"}}"#)
        .await
        .unwrap();

    let SignalMessage::Offer { sdp } = x.recv().await.unwrap() else {
        panic!("expected offer");
    };
    assert_eq!(sdp.sdp, "v=0\r\na=group:BUNDLE 0\r\n");
}

#[tokio::test]
async fn test_relay_forwards_frames_verbatim() {
    init_tracing();
    let server = TestServer::start().await;
    let url = server.ws_url();

    let mut x = TestClient::connect(&url).await.unwrap();
    let mut y = TestClient::connect(&url).await.unwrap();
    x.join("r1").await.unwrap();
    y.join("r1").await.unwrap();
    y.recv().await.unwrap();

    let bare_offer = r#"{"type":"offer","sdp":"v=0\r\n"}"#;
    y.send_raw(bare_offer).await.unwrap();
    assert_eq!(x.recv_text().await.unwrap(), bare_offer);

    let candidate = r#"{"type":"ice-candidate","candidate":{"candidate":"candidate:3 1 udp 7 203.0.113.5 3478 typ relay","sdpMid":"0","sdpMLineIndex":0,"relayProtocol":"tls"}}"#;
    x.send_raw(candidate).await.unwrap();
    assert_eq!(y.recv_text().await.unwrap(), candidate);
}
