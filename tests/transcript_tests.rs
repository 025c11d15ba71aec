//! Transcript buffer tests

use morse_writer::error::TranscriptOverflow;
use morse_writer::transcript::{TranscriptBuffer, TRANSCRIPT_CAPACITY};

#[test]
fn test_buffer_empty() {
    let buf: TranscriptBuffer = TranscriptBuffer::new();
    assert!(buf.is_empty());
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.capacity(), 512);
    assert_eq!(buf.available(), 512);
}

#[test]
fn test_fifo_order() {
    let buf: TranscriptBuffer<64> = TranscriptBuffer::new();

    for &s in b".- -" {
        buf.append(s).unwrap();
    }

    assert_eq!(buf.len(), 4);
    assert_eq!(buf.pop(), Some(b'.'));
    assert_eq!(buf.pop(), Some(b'-'));
    assert_eq!(buf.pop(), Some(b' '));
    assert_eq!(buf.pop(), Some(b'-'));
    assert_eq!(buf.pop(), None);
}

#[test]
fn test_513th_append_overflows() {
    let buf: TranscriptBuffer = TranscriptBuffer::new();

    for i in 0..TRANSCRIPT_CAPACITY {
        let symbol = if i % 2 == 0 { b'.' } else { b'-' };
        assert!(buf.append(symbol).is_ok(), "append {} failed", i);
    }

    assert_eq!(buf.append(b'\n'), Err(TranscriptOverflow));
    assert_eq!(buf.dropped(), 1);
    assert_eq!(buf.len(), TRANSCRIPT_CAPACITY);

    // First 512 still readable in order
    let mut out = [0u8; TRANSCRIPT_CAPACITY + 8];
    let n = buf.drain_into(&mut out);
    assert_eq!(n, TRANSCRIPT_CAPACITY);
    for (i, &s) in out[..n].iter().enumerate() {
        let expected = if i % 2 == 0 { b'.' } else { b'-' };
        assert_eq!(s, expected, "symbol {}", i);
    }
}

#[test]
fn test_overflow_never_overwrites() {
    let buf: TranscriptBuffer<4> = TranscriptBuffer::new();
    for &s in b"abcd" {
        buf.append(s).unwrap();
    }
    assert!(buf.append(b'e').is_err());
    assert!(buf.append(b'f').is_err());
    assert_eq!(buf.dropped(), 2);

    let drained: Vec<u8> = buf.drain(10).collect();
    assert_eq!(drained, b"abcd");
}

#[test]
fn test_drain_max_returns_oldest() {
    let buf: TranscriptBuffer<16> = TranscriptBuffer::new();
    for &s in b"... ---" {
        buf.append(s).unwrap();
    }

    let first: Vec<u8> = buf.drain(3).collect();
    assert_eq!(first, b"...");
    assert_eq!(buf.len(), 4);

    let rest: Vec<u8> = buf.drain(100).collect();
    assert_eq!(rest, b" ---");

    assert_eq!(buf.drain(5).count(), 0);
}

#[test]
fn test_drain_into_short_read() {
    let buf: TranscriptBuffer<16> = TranscriptBuffer::new();
    buf.append(b'.').unwrap();
    buf.append(b'\n').unwrap();

    let mut out = [0u8; 8];
    assert_eq!(buf.drain_into(&mut out), 2);
    assert_eq!(&out[..2], b".\n");
    assert_eq!(buf.drain_into(&mut out), 0);
}

#[test]
fn test_wrap_around() {
    let buf: TranscriptBuffer<4> = TranscriptBuffer::new();

    for round in 0..10u8 {
        buf.append(b'a' + round).unwrap();
        buf.append(b'A' + round).unwrap();
        assert_eq!(buf.pop(), Some(b'a' + round));
        assert_eq!(buf.pop(), Some(b'A' + round));
    }
    assert!(buf.is_empty());
    assert_eq!(buf.dropped(), 0);
}

#[test]
fn test_space_frees_after_drain() {
    let buf: TranscriptBuffer<4> = TranscriptBuffer::new();
    for &s in b"1234" {
        buf.append(s).unwrap();
    }
    assert!(buf.append(b'5').is_err());

    assert_eq!(buf.pop(), Some(b'1'));
    assert!(buf.append(b'5').is_ok());
    assert_eq!(buf.available(), 0);

    buf.reset_dropped();
    assert_eq!(buf.dropped(), 0);
}
