use tandem_core::{SessionDescription, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_rooms_are_isolated() {
    init_tracing();
    let server = TestServer::start().await;
    let url = server.ws_url();

    let mut a1 = TestClient::connect(&url).await.unwrap();
    let mut a2 = TestClient::connect(&url).await.unwrap();
    let mut b1 = TestClient::connect(&url).await.unwrap();
    let mut b2 = TestClient::connect(&url).await.unwrap();

    a1.join("a").await.unwrap();
    a2.join("a").await.unwrap();
    a2.recv().await.unwrap();
    b1.join("b").await.unwrap();
    b2.join("b").await.unwrap();
    b2.recv().await.unwrap();

    let offer = SignalMessage::Offer {
        sdp: SessionDescription::offer("room-a"),
    };
    a2.send(&offer).await.unwrap();
    assert_eq!(a1.recv().await.unwrap(), offer);
    b1.expect_silence().await.unwrap();
    b2.expect_silence().await.unwrap();

    // Leaving room a does not disturb room b.
    a1.close().await.unwrap();
    assert_eq!(a2.recv().await.unwrap(), SignalMessage::PeerLeft);
    b1.expect_silence().await.unwrap();
    assert_eq!(server.registry.occupancy("b"), 2);
}
