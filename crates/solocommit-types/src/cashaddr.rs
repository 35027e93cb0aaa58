//! CashAddr encoding (`prefix:payload`, BCH-code checksum).

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATORS: [u64; 5] = [
    0x98_f2bc_8e61,
    0x79_b76d_99e2,
    0xf3_3e5f_b3c4,
    0xae_2eab_e2a8,
    0x1e_4f43_e470,
];

/// Address type nibble carried in the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddrType {
    P2pkh = 0,
    P2sh = 1,
}

/// Encode `hash` as a CashAddr string with the given network prefix.
///
/// Returns `None` for hash lengths CashAddr cannot express.
pub(crate) fn encode(prefix: &str, addr_type: AddrType, hash: &[u8]) -> Option<String> {
    let size_code: u8 = match hash.len() {
        20 => 0,
        24 => 1,
        28 => 2,
        32 => 3,
        40 => 4,
        48 => 5,
        56 => 6,
        64 => 7,
        _ => return None,
    };
    let version = ((addr_type as u8) << 3) | size_code;

    let mut payload = Vec::with_capacity(hash.len() + 1);
    payload.push(version);
    payload.extend_from_slice(hash);
    let data = to_base32(&payload);

    let mut checked: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    checked.push(0);
    checked.extend_from_slice(&data);
    checked.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checked);

    let mut out = String::with_capacity(prefix.len() + 1 + data.len() + 8);
    out.push_str(prefix);
    out.push(':');
    for d in data {
        out.push(char::from(CHARSET[usize::from(d)]));
    }
    for i in 0..8 {
        let d = low_five_bits(checksum >> (5 * (7 - i)));
        out.push(char::from(CHARSET[usize::from(d)]));
    }
    Some(out)
}

fn to_base32(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for &byte in data {
        acc = ((acc << 8) | u32::from(byte)) & 0x1fff;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(low_five_bits(u64::from(acc >> bits)));
        }
    }
    if bits > 0 {
        out.push(low_five_bits(u64::from(acc << (5 - bits))));
    }
    out
}

fn low_five_bits(value: u64) -> u8 {
    value.to_le_bytes()[0] & 0x1f
}

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = c >> 35;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_p2pkh_vector() {
        let hash = hex::decode("76a04053bda0a88bda5177b86a15c3b29f559873").unwrap();
        assert_eq!(
            encode("bitcoincash", AddrType::P2pkh, &hash).unwrap(),
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
        );
    }

    #[test]
    fn reference_p2sh_vector() {
        let hash = hex::decode("76a04053bda0a88bda5177b86a15c3b29f559873").unwrap();
        assert_eq!(
            encode("bitcoincash", AddrType::P2sh, &hash).unwrap(),
            "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq"
        );
    }

    #[test]
    fn unsupported_length_rejected() {
        assert!(encode("bitcoincash", AddrType::P2pkh, &[0u8; 21]).is_none());
    }

    #[test]
    fn p2sh32_uses_size_code_three() {
        let addr = encode("bitcoincash", AddrType::P2sh, &[0u8; 32]).unwrap();
        // Version byte 0x0b encodes as "pv" in the first two characters.
        assert!(addr.starts_with("bitcoincash:pv"), "got {addr}");
    }
}
