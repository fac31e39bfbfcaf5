use std::io::Read as _;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use pixelflut_client::codec::Encoding;
use pixelflut_client::pattern::Pattern;
use pixelflut_client::primitive::{Color, Rect};
use pixelflut_client::{draw, DrawCfg, Summary};

/// Accepts a single connection and returns everything the client sent.
fn canvas() -> (String, thread::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).unwrap();
        received
    });

    (addr, handle)
}

fn square_lines() -> String {
    let mut expected = String::new();
    for i in 0..5 {
        for j in 0..5 {
            expected.push_str(&format!("PX {i} {j} ffff00\n"));
        }
    }
    expected
}

#[test]
fn square_variant() {
    let (addr, canvas) = canvas();
    let cfg = DrawCfg { addr, ..DrawCfg::square() };

    let mut echo = Vec::new();
    let summary = draw(&cfg, Some(&mut echo)).unwrap();
    let received = canvas.join().unwrap();

    let expected = square_lines();
    assert_eq!(String::from_utf8(received).unwrap(), expected);
    assert_eq!(String::from_utf8(echo).unwrap(), expected);
    assert_eq!(
        summary,
        Summary {
            pixels: 25,
            bytes: expected.len() as u64
        }
    );
}

#[test]
fn dot_variant() {
    let (addr, canvas) = canvas();
    let cfg = DrawCfg { addr, ..DrawCfg::dot() };

    let mut echo = Vec::new();
    draw(&cfg, Some(&mut echo)).unwrap();

    assert_eq!(canvas.join().unwrap(), b"PX 0 0 ffffff\n");
    assert_eq!(echo, b"PX 0 0 ffffff\n");
}

#[test]
fn batched_gradient_matches_line_by_line() {
    let (addr, canvas) = canvas();
    let mut cfg = DrawCfg::new(addr, Pattern::Gradient);
    cfg.batched = true;
    cfg.connect_timeout = Some(Duration::from_secs(5));

    let summary = draw(&cfg, None).unwrap();
    let received = String::from_utf8(canvas.join().unwrap()).unwrap();

    assert_eq!(summary.pixels, 256 * 256);
    assert_eq!(summary.bytes, received.len() as u64);
    assert_eq!(received.lines().count(), 256 * 256);
    assert_eq!(received.lines().nth(1), Some("PX 0 1 000100"));
    assert_eq!(received.lines().last(), Some("PX 255 255 ffffff"));
}

#[test]
fn binary_rect() {
    let (addr, canvas) = canvas();
    let mut cfg = DrawCfg::new(
        addr,
        Pattern::Rect {
            rect: Rect::new(300, 2, 2, 1),
            color: Color(1, 2, 3),
        },
    );
    cfg.encoding = Encoding::Binary;

    draw(&cfg, None).unwrap();

    let received = canvas.join().unwrap();
    assert_eq!(
        received,
        [
            b'P', 0x2c, 0x01, 2, 0, 1, 2, 3, //
            b'P', 0x2d, 0x01, 2, 0, 1, 2, 3,
        ]
    );
}

#[test]
fn connection_refused_is_an_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let err = draw(&DrawCfg::new(addr.clone(), Pattern::Dot), None).unwrap_err();
    assert!(format!("{err:#}").contains("couldn't connect"), "{err:#}");

    let mut cfg = DrawCfg::new(addr, Pattern::Dot);
    cfg.connect_timeout = Some(Duration::from_secs(1));
    assert!(draw(&cfg, None).is_err());
}
