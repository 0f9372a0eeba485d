use avatar_speech::comm::{Framer, FramerLimits};
use proptest::prelude::*;

fn record_text() -> impl Strategy<Value = String> {
    // Printable text without braces or line breaks, including multibyte
    proptest::string::string_regex("[a-zA-Z0-9 あいうえおこんにちは元気？]{1,24}")
        .expect("valid regex")
}

fn encode(texts: &[String]) -> Vec<u8> {
    texts
        .iter()
        .map(|t| format!(r#"{{"message":["{}"]}}"#, t))
        .collect::<String>()
        .into_bytes()
}

fn collect(framer: &mut Framer, chunks: impl Iterator<Item = Vec<u8>>) -> Vec<Vec<u8>> {
    let mut now = 0;
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(framer.feed(&chunk, now).into_iter().map(|r| r.bytes));
        now += 1;
    }
    out
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_records(
        texts in proptest::collection::vec(record_text(), 1..6),
        split in 1usize..17,
    ) {
        let bytes = encode(&texts);
        let limits = FramerLimits { dedup_cooldown_ms: 0, ..FramerLimits::default() };

        let whole = collect(&mut Framer::new(limits), std::iter::once(bytes.clone()));
        let chunked = collect(
            &mut Framer::new(limits),
            bytes.chunks(split).map(|c| c.to_vec()),
        );

        prop_assert_eq!(&whole, &chunked);
        prop_assert_eq!(whole.len(), texts.len());
    }

    #[test]
    fn prop_records_are_valid_utf8(
        texts in proptest::collection::vec(record_text(), 1..6),
        split in 1usize..9,
    ) {
        let bytes = encode(&texts);
        let limits = FramerLimits { dedup_cooldown_ms: 0, ..FramerLimits::default() };
        let records = collect(&mut Framer::new(limits), bytes.chunks(split).map(|c| c.to_vec()));
        for record in records {
            prop_assert!(std::str::from_utf8(&record).is_ok());
        }
    }

    #[test]
    fn prop_buffer_never_exceeds_limit(
        noise in proptest::collection::vec(any::<u8>(), 0..600),
        max in 16usize..128,
    ) {
        let mut framer = Framer::new(FramerLimits { max_buffer_size: max, dedup_cooldown_ms: 0 });
        for byte in noise {
            framer.feed(&[byte], 0);
            prop_assert!(framer.buffered().len() < max);
        }
    }
}
