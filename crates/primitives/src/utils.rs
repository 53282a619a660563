//! Misc utils

use ethers::{types::Address, utils::to_checksum};
use serde::Serialize;
use serde_json::Value;

/// Converts address to checksum address
pub fn as_checksum<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Serializes a value the way bundler RPC endpoints expect it: every
/// quantity and byte string as a 0x-prefixed lowercase hex string
pub fn deep_hexlify<T: Serialize>(val: &T) -> serde_json::Result<Value> {
    Ok(hexlify_value(serde_json::to_value(val)?))
}

fn hexlify_value(val: Value) -> Value {
    match val {
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            Value::String(format!("0x{}", s[2..].to_lowercase()))
        }
        Value::Number(n) => match n.as_u64() {
            Some(u) => Value::String(format!("{u:#x}")),
            None => Value::Number(n),
        },
        Value::Array(arr) => Value::Array(arr.into_iter().map(hexlify_value).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, hexlify_value(v))).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserOperation;
    use ethers::types::Bytes;

    #[test]
    fn deep_hexlify_user_operation() {
        let uo = UserOperation::default()
            .sender("0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap())
            .nonce(0.into())
            .call_gas_limit(33_100.into())
            .pre_verification_gas(45_040.into())
            .signature(Bytes::from(vec![0xab, 0xcd]));

        let v = deep_hexlify(&uo).unwrap();
        assert_eq!(v["sender"], "0x9c5754de1443984659e1b3a8d1931d83475ba29c");
        assert_eq!(v["nonce"], "0x0");
        assert_eq!(v["callGasLimit"], "0x814c");
        assert_eq!(v["preVerificationGas"], "0xaff0");
        assert_eq!(v["signature"], "0xabcd");
        assert_eq!(v["initCode"], "0x");
    }

    #[test]
    fn deep_hexlify_numbers() {
        let v = deep_hexlify(&serde_json::json!({ "a": 45040, "b": ["0xAB", 0] })).unwrap();
        assert_eq!(v["a"], "0xaff0");
        assert_eq!(v["b"][0], "0xab");
        assert_eq!(v["b"][1], "0x0");
    }
}
