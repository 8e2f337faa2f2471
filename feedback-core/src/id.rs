use crate::model::EntityId;
use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: u32 = 8;

/// Builds a new entity id from the current time in microseconds followed by a random suffix,
/// both base 36.
///
/// Collisions are unlikely but possible, and the ids are guessable. Callers that need a
/// guaranteed-unique id have to check the store before using one.
pub fn generate_entity_id() -> EntityId {
    let micros = u64::try_from(Utc::now().timestamp_micros()).unwrap_or_default();
    let suffix = rand::thread_rng().gen_range(0..36u64.pow(SUFFIX_LEN));

    let mut id = encode_base36(micros, 0);
    id.push_str(&encode_base36(suffix, SUFFIX_LEN as usize));
    EntityId::new(id)
}

/// Left-pads with zeros up to `min_width`.
fn encode_base36(mut value: u64, min_width: usize) -> String {
    let mut digits = Vec::with_capacity(13);
    loop {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    while digits.len() < min_width {
        digits.push(b'0');
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_encoding() {
        assert_eq!("0", encode_base36(0, 0));
        assert_eq!("z", encode_base36(35, 0));
        assert_eq!("10", encode_base36(36, 0));
        assert_eq!("0000000z", encode_base36(35, 8));
        assert_eq!("3w5e11264sgsf", encode_base36(u64::MAX, 0));
    }

    #[test]
    fn ids_are_lowercase_alphanumeric() {
        let id = generate_entity_id();

        assert!(id.as_str().len() > SUFFIX_LEN as usize);
        assert!(
            id.as_str()
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()),
            "unexpected character in {id}"
        );
    }

    #[test]
    fn ids_do_not_repeat_in_a_tight_loop() {
        let ids: HashSet<_> = (0..1000).map(|_| generate_entity_id()).collect();
        assert_eq!(1000, ids.len());
    }
}
