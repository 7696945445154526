//! Maps a DNS domain onto a `DC=` distinguished name.

use super::buffer::{BoundedBuffer, Overflow};

const COMPONENT_PREFIX: &str = "DC=";
const SEPARATOR: &str = ",";

/// Non-empty `.`-separated labels of `domain`, in order.
///
/// Leading, trailing, and repeated dots produce no labels.
pub fn labels(domain: &str) -> impl Iterator<Item = &str> {
    domain.split('.').filter(|label| !label.is_empty())
}

/// Builds `DC=<label>,DC=<label>,...` for `domain` inside `buffer`.
///
/// The full length is checked before anything is written, so an overflow
/// commits nothing. A domain without labels maps to the empty DN.
///
/// # Errors
///
/// Returns [`Overflow`] when the DN does not fit the remaining capacity.
pub fn domain_to_dn(domain: &str, buffer: &mut BoundedBuffer) -> Result<String, Overflow> {
    let required = required_len(domain);
    if required > buffer.remaining() {
        return Err(Overflow {
            requested: required,
            remaining: buffer.remaining(),
        });
    }

    let mut dn = String::with_capacity(required);
    for (position, label) in labels(domain).enumerate() {
        if position > 0 {
            dn.push_str(SEPARATOR);
        }
        dn.push_str(COMPONENT_PREFIX);
        dn.push_str(label);
    }
    buffer.try_append(&dn)?;
    Ok(buffer.take_pending())
}

fn required_len(domain: &str) -> usize {
    let (count, label_bytes) = labels(domain).fold((0_usize, 0_usize), |(count, bytes), label| {
        (count + 1, bytes + label.len())
    });
    if count == 0 {
        return 0;
    }
    label_bytes + count * COMPONENT_PREFIX.len() + (count - 1) * SEPARATOR.len()
}
