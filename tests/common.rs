use csv::ReaderBuilder;
use either::Either::{Left, Right};
use pulsewire::{
    DecoderConfig, FrameFormat, SensorRecord, StreamDecoder, StreamError, Value,
    avec::{FromRecord, slice::decode_with},
    sans::{
        check::{Checksum, compute_crc},
        format::{ByteOrder, ChecksumSpec, Encoding, FieldSpec},
        stream::{DEFAULT_MAX_BUFFERED, Seeking},
        validate::Rejection,
    },
};

const PATH: &str = "fixtures/frames.csv";

/// Eight-byte frames: alignment `A5 5A`, five payload bytes, and the
/// exclusive-or of the payload.
const FORMAT: FrameFormat<'static> = FrameFormat {
    name: "test-xor",
    frame_size: 8,
    alignment: &[0xA5, 0x5A],
    checksum: ChecksumSpec {
        start: 2,
        end: 7,
        offset: 7,
        width: 1,
        order: ByteOrder::Little,
        algorithm: Checksum::Xor8,
    },
    constraints: &[],
    fields: &[
        payload_field("f2", 2),
        payload_field("f3", 3),
        payload_field("f4", 4),
        payload_field("f5", 5),
        payload_field("f6", 6),
    ],
};

const fn payload_field(name: &'static str, offset: usize) -> FieldSpec<'static> {
    FieldSpec {
        name,
        offset,
        width: 1,
        encoding: Encoding::Unsigned(ByteOrder::Little),
    }
}

fn payloads() -> Vec<[u8; 5]> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(PATH)
        .unwrap();

    reader
        .records()
        .map(|r| {
            let values: Vec<u8> = r.unwrap().iter().map(|f| f.parse().unwrap()).collect();
            values.try_into().unwrap()
        })
        .collect()
}

fn frame(payload: [u8; 5]) -> Vec<u8> {
    let checksum = payload.iter().fold(0, |acc, b| acc ^ b);
    let mut frame = vec![0xA5, 0x5A];
    frame.extend_from_slice(&payload);
    frame.push(checksum);
    frame
}

fn stream(payloads: &[[u8; 5]]) -> Vec<u8> {
    payloads.iter().copied().flat_map(frame).collect()
}

fn values(records: &[SensorRecord]) -> Vec<[u8; 5]> {
    records
        .iter()
        .map(|record| {
            let bytes: Vec<u8> = record
                .iter()
                .map(|(_, v)| v.as_u64().unwrap() as u8)
                .collect();
            bytes.try_into().unwrap()
        })
        .collect()
}

fn feed_chunked(bytes: &[u8], chunk: usize) -> Vec<SensorRecord<'static>> {
    let mut decoder = StreamDecoder::new(FORMAT);
    bytes
        .chunks(chunk)
        .flat_map(|c| decoder.feed(c).unwrap())
        .collect()
}

#[test]
fn format_is_consistent() {
    assert!(FORMAT.is_consistent());
}

#[test]
fn concrete_two_frames() {
    let once = frame([0x01, 0x02, 0x03, 0x04, 0x05]);
    assert_eq!(once, [0xA5, 0x5A, 0x01, 0x02, 0x03, 0x04, 0x05, 0x01]);

    let twice = [once.clone(), once].concat();
    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&twice).unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.get("f2"), Some(Value::UInt(1)));
        assert_eq!(record.get("f6"), Some(Value::UInt(5)));
        assert_eq!(record.timestamp(), None);
    }
    assert_eq!(decoder.buffered(), 0);
}

#[test]
fn back_to_back_frames_in_order() {
    let payloads = payloads();
    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&stream(&payloads)).unwrap();
    assert_eq!(values(&records), payloads);
}

#[test]
fn record_fields_follow_descriptor_order() {
    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&frame([9, 8, 7, 6, 5])).unwrap();

    let names: Vec<&str> = records[0].iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["f2", "f3", "f4", "f5", "f6"]);
}

#[test]
fn chunk_boundary_independence() {
    let payloads = payloads();
    let bytes = stream(&payloads);
    let whole = values(&feed_chunked(&bytes, bytes.len()));

    for chunk in 1..=bytes.len() {
        assert_eq!(values(&feed_chunked(&bytes, chunk)), whole, "chunk {chunk}");
    }
}

#[test]
fn irregular_chunk_boundaries() {
    let payloads = payloads();
    let bytes = stream(&payloads);

    let mut decoder = StreamDecoder::new(FORMAT);
    let mut records = vec![];
    let mut rest = &bytes[..];
    let mut seed = 7usize;

    while !rest.is_empty() {
        seed = (seed * 31 + 11) % 23;
        let (chunk, tail) = rest.split_at((seed + 1).min(rest.len()));
        records.extend(decoder.feed(chunk).unwrap());
        rest = tail;
    }

    assert_eq!(values(&records), payloads);
}

#[test]
fn garbage_between_frames() {
    let payloads = payloads();

    for k in [1, 2, 7, 8, 9, 100] {
        let garbage: Vec<u8> = (0..k).map(|i| (i * 13 % 0xA0) as u8).collect();
        let bytes = [frame(payloads[0]), garbage, frame(payloads[1])].concat();

        let mut decoder = StreamDecoder::new(FORMAT);
        let records = decoder.feed(&bytes).unwrap();
        assert_eq!(values(&records), &payloads[..2], "{k} garbage bytes");
    }
}

#[test]
fn false_alignment_before_frame() {
    let payloads = payloads();
    let bytes = [vec![0xA5, 0x5A, 0x11], frame(payloads[1])].concat();

    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&bytes).unwrap();
    assert_eq!(values(&records), &payloads[1..2]);
}

#[test]
fn corrupted_byte_drops_only_its_frame() {
    let payloads = payloads();

    for corrupt in 2..8 {
        let mut frames: Vec<Vec<u8>> = payloads[..3].iter().copied().map(frame).collect();
        frames[1][corrupt] ^= 0x40;

        let mut decoder = StreamDecoder::new(FORMAT);
        let records = decoder.feed(&frames.concat()).unwrap();
        assert_eq!(
            values(&records),
            [payloads[0], payloads[2]],
            "corrupted byte {corrupt}"
        );
    }
}

#[test]
fn partial_frame_yields_nothing() {
    let bytes = frame([1, 2, 3, 4, 5]);
    let mut decoder = StreamDecoder::new(FORMAT);

    assert!(decoder.feed(&bytes[..7]).unwrap().is_empty());
    assert_eq!(decoder.buffered(), 7);

    let records = decoder.feed(&bytes[7..]).unwrap();
    assert_eq!(values(&records), [[1, 2, 3, 4, 5]]);
}

#[test]
fn unaligned_garbage_is_not_retained() {
    let mut decoder = StreamDecoder::with_config(FORMAT, DecoderConfig::default().with_max_buffered(32));

    for _ in 0..100 {
        assert!(decoder.feed(&[0x00, 0x11, 0x22, 0x33, 0xA5]).unwrap().is_empty());
        assert_eq!(decoder.buffered(), 1);
    }
}

#[test]
fn stalled_synchronizer_poisons_decoder() {
    let config = DecoderConfig::default()
        .with_max_buffered(32)
        .with_rejection_budget(4);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);

    // Every pair is a false alignment, more than the budget can clear.
    let false_alignments = [0xA5, 0x5A].repeat(40);
    assert_eq!(
        decoder.feed(&false_alignments),
        Err(StreamError::StreamCorrupt {
            buffered: 73,
            limit: 32
        })
    );
    assert!(decoder.is_poisoned());

    assert_eq!(decoder.feed(&frame([1, 2, 3, 4, 5])), Err(StreamError::Poisoned));
    assert_eq!(decoder.feed(&[]), Err(StreamError::Poisoned));
}

#[test]
fn chunk_longer_than_maximum() {
    let payloads = payloads();
    let frames: Vec<[u8; 5]> = payloads.iter().copied().cycle().take(600).collect();
    let bytes = stream(&frames);
    assert!(bytes.len() > DEFAULT_MAX_BUFFERED);

    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&bytes).unwrap();
    assert_eq!(values(&records), frames);
    assert_eq!(decoder.buffered(), 0);

    let config = DecoderConfig::default().with_max_buffered(16);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);
    let records = decoder.feed(&bytes).unwrap();
    assert_eq!(values(&records), frames);
}

#[test]
fn garbage_longer_than_maximum() {
    let config = DecoderConfig::default().with_max_buffered(32);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);

    let bytes = [vec![0x33; 1000], frame([1, 2, 3, 4, 5])].concat();
    let records = decoder.feed(&bytes).unwrap();
    assert_eq!(values(&records), [[1, 2, 3, 4, 5]]);
    assert!(!decoder.is_poisoned());
}

#[test]
fn maximum_never_below_one_frame() {
    let config = DecoderConfig::default().with_max_buffered(0);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);

    let records = decoder.feed(&frame([1, 2, 3, 4, 5])).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn rejection_budget_defers_work() {
    let payloads = payloads();
    let false_alignments = [0xA5, 0x5A].repeat(20);
    let bytes = [false_alignments, frame(payloads[0])].concat();

    let config = DecoderConfig::default().with_rejection_budget(4);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);

    let mut records = decoder.feed(&bytes).unwrap();
    assert!(records.is_empty());
    assert!(decoder.has_deferred_work());

    let mut calls = 1;
    while decoder.has_deferred_work() {
        records.extend(decoder.feed(&[]).unwrap());
        calls += 1;
    }

    assert_eq!(calls, 6);
    assert_eq!(values(&records), &payloads[..1]);
    assert_eq!(decoder.buffered(), 0);
}

#[test]
fn spent_budget_without_candidates_is_not_deferred() {
    let config = DecoderConfig::default().with_rejection_budget(1);
    let mut decoder = StreamDecoder::with_config(FORMAT, config);

    let mut bytes = frame([1, 2, 3, 4, 5]);
    bytes[7] ^= 0xFF;

    assert!(decoder.feed(&bytes).unwrap().is_empty());
    assert!(!decoder.has_deferred_work());
    assert_eq!(decoder.buffered(), 0);
}

#[test]
fn slice_with_small_maximum() {
    let payloads = payloads();
    let bytes = [[0xA5, 0x5A].repeat(30), stream(&payloads)].concat();

    let config = DecoderConfig::default()
        .with_max_buffered(16)
        .with_rejection_budget(2);
    let mut records: Vec<Payload> = vec![];
    decode_with(StreamDecoder::with_config(FORMAT, config), &bytes, &mut records).unwrap();

    let f2: Vec<u64> = records.iter().map(|r| r.0[0]).collect();
    let expected: Vec<u64> = payloads.iter().map(|p| p[0].into()).collect();
    assert_eq!(f2, expected);
}

#[derive(Debug, Default)]
struct Payload([u64; 5]);

impl FromRecord for Payload {
    fn add_u64(&mut self, field: &str, value: u64) {
        let index = match field {
            "f2" => 0,
            "f3" => 1,
            "f4" => 2,
            "f5" => 3,
            "f6" => 4,
            _ => return,
        };
        self.0[index] = value;
    }
}

#[test]
fn two_byte_checksum() {
    const CRC_FORMAT: FrameFormat<'static> = FrameFormat {
        name: "test-crc16",
        frame_size: 8,
        alignment: &[0x7E],
        checksum: ChecksumSpec {
            start: 1,
            end: 6,
            offset: 6,
            width: 2,
            order: ByteOrder::Big,
            algorithm: Checksum::Crc16,
        },
        constraints: &[],
        fields: &[FieldSpec {
            name: "reading",
            offset: 2,
            width: 4,
            encoding: Encoding::Signed(ByteOrder::Big),
        }],
    };
    assert!(CRC_FORMAT.is_consistent());

    let mut frame = vec![0x7E, 0x01];
    frame.extend_from_slice(&(-1200i32).to_be_bytes());
    frame.extend_from_slice(&compute_crc(0, &frame[1..6]).to_be_bytes());

    let mut corrupted = frame.clone();
    corrupted[3] ^= 0x10;

    let mut decoder = StreamDecoder::new(CRC_FORMAT);
    let records = decoder.feed(&[corrupted, frame].concat()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("reading"), Some(Value::Int(-1200)));
}

#[test]
fn state_tokens() {
    let bytes = [vec![0x00, 0x00], frame([1, 2, 3, 4, 5])].concat();

    let Right(candidate) = Seeking::new().advance(&bytes, &FORMAT) else {
        panic!("expected a candidate frame");
    };
    assert_eq!(candidate.offset(), 2);

    let (record, consumed, _) = candidate.advance(&bytes, &FORMAT);
    assert_eq!(record.unwrap().get("f4"), Some(Value::UInt(3)));
    assert_eq!(consumed, 10);

    let Left((discardable, _)) = Seeking::new().advance(&bytes[..9], &FORMAT) else {
        panic!("expected insufficient data");
    };
    assert_eq!(discardable, 2);
}

#[test]
fn rejected_candidate_discards_one_byte() {
    let mut bytes = frame([1, 2, 3, 4, 5]);
    bytes[7] ^= 0xFF;

    let Right(candidate) = Seeking::new().advance(&bytes, &FORMAT) else {
        panic!("expected a candidate frame");
    };

    let (record, consumed, _) = candidate.advance(&bytes, &FORMAT);
    assert_eq!(
        record,
        Err(Rejection::Checksum {
            found: 0xFE,
            calculated: 0x01
        })
    );
    assert_eq!(consumed, 1);
}

#[test]
fn stamped_records() {
    let mut decoder = StreamDecoder::new(FORMAT);
    let records = decoder.feed(&frame([1, 2, 3, 4, 5])).unwrap();

    let record = records.into_iter().next().unwrap().stamped(1_700_000_000);
    assert_eq!(record.timestamp(), Some(1_700_000_000));
    assert_eq!(record.len(), 5);
}
