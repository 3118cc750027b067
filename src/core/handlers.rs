//! Operation handlers
//!
//! Each handler validates its positional arguments, reads whatever ledger state
//! it needs, computes new values and writes them back. Handlers hold no state of
//! their own and never retry: the first error is returned unchanged.
//!
//! Handlers write straight to whatever ledger they are given. Atomicity across
//! several writes is layered on top by [`LedgerHandler`](crate::core::LedgerHandler),
//! which hands them a [`StagedLedger`](crate::core::StagedLedger) when configured to.

use crate::core::traits::Ledger;
use crate::types::{DecodeMode, HandlerError, Payload};
use sha2::{Digest, Sha256};
use std::num::IntErrorKind;
use tracing::{debug, info};

/// Keys written by `initialize`, in write order
pub const CONFIG_FIELDS: [&str; 4] = ["Id", "Name", "Date", "Detail"];

/// Arguments `initialize` requires; only the first four are stored
pub const INITIALIZE_ARG_COUNT: usize = 8;

/// Arguments `transfer` requires: source, destination, amount
pub const TRANSFER_ARG_COUNT: usize = 3;

/// Arguments `delete_entity` requires: the key
pub const DELETE_ARG_COUNT: usize = 1;

/// Arguments `query` requires: the key
pub const QUERY_ARG_COUNT: usize = 1;

/// Fixed amount added to every destination credit
///
/// Historical ledgers were built with this offset, so balances only reconcile
/// if it is kept.
pub const LEGACY_CREDIT_OFFSET: i64 = 2;

/// Label reported by `ValueDecode` for the transfer amount
///
/// Angle brackets keep it distinct from any balance key a caller can name.
pub const AMOUNT_LABEL: &str = "<amount>";

/// Input of the diagnostic digest logged by `query`
pub const QUERY_DIAGNOSTIC_INPUT: &[u8] = b"123ABC456";

fn expect_args(operation: &str, args: &[String], expected: usize) -> Result<(), HandlerError> {
    if args.len() != expected {
        return Err(HandlerError::argument_count(operation, expected, args.len()));
    }
    Ok(())
}

/// Write the configuration entries
///
/// Requires exactly eight arguments. Arguments 0 to 3 are stored verbatim under
/// `Id`, `Name`, `Date` and `Detail`; arguments 4 to 7 are accepted and ignored.
///
/// # Errors
///
/// - `ArgumentCount` if `args.len() != 8` (nothing is written)
/// - `StorageWrite` naming the first field the ledger refused; fields written
///   before it stay written
pub fn initialize<L: Ledger + ?Sized>(
    ledger: &mut L,
    args: &[String],
) -> Result<Payload, HandlerError> {
    debug!("initializing configuration fields");
    expect_args("init", args, INITIALIZE_ARG_COUNT)?;

    for (field, value) in CONFIG_FIELDS.into_iter().zip(args) {
        ledger
            .put(field, value.as_bytes())
            .map_err(|e| HandlerError::storage_write(field, e))?;
        debug!(field, "set configuration field");
    }

    Ok(None)
}

/// Move `amount` from one balance entry to another
///
/// Takes `[source, destination, amount]`. Both balances must already exist.
/// The source is debited by `amount`; the destination is credited by
/// `amount + LEGACY_CREDIT_OFFSET`. The amount may be negative.
///
/// Reads and decoding happen before any write, so every failure except a
/// storage write leaves the ledger untouched.
///
/// # Errors
///
/// - `ArgumentCount` if `args.len() != 3`
/// - `StorageRead` / `EntityNotFound` for either balance
/// - `ValueDecode` for a non-integer balance or amount (strict decoding only)
/// - `ArithmeticOverflow` if either new balance leaves the `i64` range
/// - `StorageWrite` for the first write the ledger refuses
pub fn transfer<L: Ledger + ?Sized>(
    ledger: &mut L,
    args: &[String],
    mode: DecodeMode,
) -> Result<Payload, HandlerError> {
    debug!("running transfer");
    expect_args("invoke", args, TRANSFER_ARG_COUNT)?;

    let source = args[0].as_str();
    let destination = args[1].as_str();

    let source_balance = read_balance(ledger, source, mode)?;
    let destination_balance = read_balance(ledger, destination, mode)?;
    let amount = decode_integer(AMOUNT_LABEL, args[2].as_bytes(), mode)?;

    let new_source = source_balance
        .checked_sub(amount)
        .ok_or_else(|| HandlerError::arithmetic_overflow("invoke", source))?;
    let new_destination = destination_balance
        .checked_add(amount)
        .and_then(|value| value.checked_add(LEGACY_CREDIT_OFFSET))
        .ok_or_else(|| HandlerError::arithmetic_overflow("invoke", destination))?;

    info!(
        source,
        destination,
        amount,
        new_source,
        new_destination,
        "transfer computed"
    );

    ledger
        .put(source, new_source.to_string().as_bytes())
        .map_err(|e| HandlerError::storage_write(source, e))?;
    ledger
        .put(destination, new_destination.to_string().as_bytes())
        .map_err(|e| HandlerError::storage_write(destination, e))?;

    Ok(None)
}

/// Remove a single entry
///
/// Deleting a key that does not exist succeeds unless the ledger itself
/// reports an error.
///
/// # Errors
///
/// - `ArgumentCount` if `args.len() != 1`
/// - `StorageDelete` if the ledger refuses the delete
pub fn delete_entity<L: Ledger + ?Sized>(
    ledger: &mut L,
    args: &[String],
) -> Result<Payload, HandlerError> {
    debug!("running delete");
    expect_args("delete", args, DELETE_ARG_COUNT)?;

    let key = args[0].as_str();
    ledger
        .delete(key)
        .map_err(|e| HandlerError::storage_delete(key, e))?;

    Ok(None)
}

/// Read-path stub
///
/// Validates the function name and the key argument, logs a fixed diagnostic
/// digest and returns no payload. It does not read the ledger.
///
/// # Errors
///
/// - `InvalidQueryFunction` if `function != "query"`
/// - `ArgumentCount` if `args.len() != 1`
pub fn query(function: &str, args: &[String]) -> Result<Payload, HandlerError> {
    let digest = hex::encode(Sha256::digest(QUERY_DIAGNOSTIC_INPUT));
    debug!(%digest, "query diagnostic digest");

    if function != "query" {
        return Err(HandlerError::invalid_query_function(function));
    }
    expect_args("query", args, QUERY_ARG_COUNT)?;

    // TODO: return the stored value once the read contract for `query` is settled.
    debug!(key = %args[0], "query received");
    Ok(None)
}

fn read_balance<L: Ledger + ?Sized>(
    ledger: &L,
    key: &str,
    mode: DecodeMode,
) -> Result<i64, HandlerError> {
    let raw = ledger
        .get(key)
        .map_err(|e| HandlerError::storage_read(key, e))?
        .ok_or_else(|| HandlerError::entity_not_found(key))?;
    decode_integer(key, &raw, mode)
}

/// Decode a base-10 `i64`
///
/// Lenient mode keeps what a saturating parse leaves behind: out-of-range
/// values become `i64::MAX` or `i64::MIN`, anything else that fails becomes 0.
fn decode_integer(label: &str, raw: &[u8], mode: DecodeMode) -> Result<i64, HandlerError> {
    let kind = match std::str::from_utf8(raw).map(|text| text.parse::<i64>()) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => Some(e.kind().clone()),
        Err(_) => None,
    };

    match mode {
        DecodeMode::Strict => Err(HandlerError::value_decode(label, raw)),
        DecodeMode::Lenient => {
            let value = match kind {
                Some(IntErrorKind::PosOverflow) => i64::MAX,
                Some(IntErrorKind::NegOverflow) => i64::MIN,
                _ => 0,
            };
            debug!(key = label, value, "undecodable integer replaced");
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory_ledger::MemoryLedger;
    use crate::core::testing::FaultyLedger;
    use crate::types::StoreError;
    use rstest::rstest;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn seeded() -> MemoryLedger {
        MemoryLedger::with_entries([("A", "100"), ("B", "50")])
    }

    #[test]
    fn test_initialize_writes_first_four_args() {
        let mut ledger = MemoryLedger::new();
        let result = initialize(
            &mut ledger,
            &args(&["id1", "name1", "2024-01-01", "detail1", "x", "x", "x", "x"]),
        );

        assert_eq!(result, Ok(None));
        assert_eq!(ledger.get_str("Id").as_deref(), Some("id1"));
        assert_eq!(ledger.get_str("Name").as_deref(), Some("name1"));
        assert_eq!(ledger.get_str("Date").as_deref(), Some("2024-01-01"));
        assert_eq!(ledger.get_str("Detail").as_deref(), Some("detail1"));
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn test_initialize_stores_values_verbatim() {
        let mut ledger = MemoryLedger::new();
        initialize(
            &mut ledger,
            &args(&[" spaced ", "", "not a date", "ünïcödé", "a", "b", "c", "d"]),
        )
        .unwrap();

        assert_eq!(ledger.get_str("Id").as_deref(), Some(" spaced "));
        assert_eq!(ledger.get_str("Name").as_deref(), Some(""));
        assert_eq!(ledger.get_str("Date").as_deref(), Some("not a date"));
        assert_eq!(ledger.get_str("Detail").as_deref(), Some("ünïcödé"));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(7)]
    #[case(9)]
    fn test_initialize_wrong_arg_count_writes_nothing(#[case] count: usize) {
        let mut ledger = FaultyLedger::default();
        let values = vec!["v".to_string(); count];

        let result = initialize(&mut ledger, &values);

        assert_eq!(result, Err(HandlerError::argument_count("init", 8, count)));
        assert!(ledger.writes.is_empty());
    }

    #[test]
    fn test_initialize_write_failure_names_field_and_keeps_earlier_writes() {
        let mut ledger = FaultyLedger::default().failing_put("Date");

        let result = initialize(
            &mut ledger,
            &args(&["i", "n", "d", "x", "1", "2", "3", "4"]),
        );

        assert_eq!(
            result,
            Err(HandlerError::storage_write(
                "Date",
                StoreError::unavailable("injected fault")
            ))
        );
        assert_eq!(ledger.writes, vec!["Id", "Name"]);
        assert_eq!(ledger.inner.get("Detail").unwrap(), None);
    }

    #[test]
    fn test_transfer_applies_legacy_arithmetic() {
        let mut ledger = seeded();

        let result = transfer(&mut ledger, &args(&["A", "B", "10"]), DecodeMode::Strict);

        assert_eq!(result, Ok(None));
        assert_eq!(ledger.get_str("A").as_deref(), Some("90"));
        assert_eq!(ledger.get_str("B").as_deref(), Some("62"));
    }

    #[rstest]
    #[case::positive("100", "50", "10", "90", "62")]
    #[case::negative_amount("100", "50", "-30", "130", "22")]
    #[case::zero_amount("7", "7", "0", "7", "9")]
    #[case::goes_negative("5", "0", "20", "-15", "22")]
    #[case::explicit_plus_sign("+10", "0", "+1", "9", "3")]
    fn test_transfer_arithmetic(
        #[case] a: &str,
        #[case] b: &str,
        #[case] amount: &str,
        #[case] expected_a: &str,
        #[case] expected_b: &str,
    ) {
        let mut ledger = MemoryLedger::with_entries([("A", a), ("B", b)]);

        transfer(&mut ledger, &args(&["A", "B", amount]), DecodeMode::Strict).unwrap();

        assert_eq!(ledger.get_str("A").as_deref(), Some(expected_a));
        assert_eq!(ledger.get_str("B").as_deref(), Some(expected_b));
    }

    #[test]
    fn test_transfer_same_key_keeps_destination_write() {
        let mut ledger = MemoryLedger::with_entries([("A", "100")]);

        transfer(&mut ledger, &args(&["A", "A", "10"]), DecodeMode::Strict).unwrap();

        // Both balances are read before writing; the destination write lands last.
        assert_eq!(ledger.get_str("A").as_deref(), Some("112"));
    }

    #[rstest]
    #[case(&[])]
    #[case(&["A", "B"])]
    #[case(&["A", "B", "10", "extra"])]
    fn test_transfer_wrong_arg_count(#[case] values: &[&str]) {
        let mut ledger = seeded();
        let result = transfer(&mut ledger, &args(values), DecodeMode::Strict);
        assert_eq!(
            result,
            Err(HandlerError::argument_count("invoke", 3, values.len()))
        );
    }

    #[rstest]
    #[case::missing_source(&["X", "B", "1"], "X")]
    #[case::missing_destination(&["A", "Y", "1"], "Y")]
    fn test_transfer_missing_entity_writes_nothing(#[case] values: &[&str], #[case] key: &str) {
        let mut ledger = FaultyLedger::new(seeded());

        let result = transfer(&mut ledger, &args(values), DecodeMode::Strict);

        assert_eq!(result, Err(HandlerError::entity_not_found(key)));
        assert!(ledger.writes.is_empty());
    }

    #[test]
    fn test_transfer_read_failure() {
        let mut ledger = FaultyLedger::new(seeded()).failing_get("B");

        let result = transfer(&mut ledger, &args(&["A", "B", "1"]), DecodeMode::Strict);

        assert!(matches!(result, Err(HandlerError::StorageRead { key, .. }) if key == "B"));
        assert!(ledger.writes.is_empty());
    }

    #[test]
    fn test_transfer_destination_write_failure_keeps_source_write() {
        let mut ledger = FaultyLedger::new(seeded()).failing_put("B");

        let result = transfer(&mut ledger, &args(&["A", "B", "10"]), DecodeMode::Strict);

        assert!(matches!(result, Err(HandlerError::StorageWrite { key, .. }) if key == "B"));
        assert_eq!(ledger.inner.get_str("A").as_deref(), Some("90"));
        assert_eq!(ledger.inner.get_str("B").as_deref(), Some("50"));
    }

    #[rstest]
    #[case::bad_source(("abc", "50"), "10", "A", "abc")]
    #[case::bad_destination(("100", "5.5"), "10", "B", "5.5")]
    #[case::bad_amount(("100", "50"), "ten", AMOUNT_LABEL, "ten")]
    #[case::empty_amount(("100", "50"), "", AMOUNT_LABEL, "")]
    #[case::out_of_range_amount(("100", "50"), "99999999999999999999", AMOUNT_LABEL, "99999999999999999999")]
    fn test_transfer_strict_decode_failure(
        #[case] balances: (&str, &str),
        #[case] amount: &str,
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let mut ledger =
            FaultyLedger::new(MemoryLedger::with_entries([("A", balances.0), ("B", balances.1)]));

        let result = transfer(&mut ledger, &args(&["A", "B", amount]), DecodeMode::Strict);

        assert_eq!(
            result,
            Err(HandlerError::ValueDecode {
                key: key.to_string(),
                value: value.to_string()
            })
        );
        assert!(ledger.writes.is_empty());
    }

    #[rstest]
    #[case::bad_source(("abc", "50"), "10", "-10", "62")]
    #[case::bad_destination(("100", "x"), "10", "90", "12")]
    #[case::bad_amount(("100", "50"), "ten", "100", "52")]
    fn test_transfer_lenient_decode_treats_as_zero(
        #[case] balances: (&str, &str),
        #[case] amount: &str,
        #[case] expected_a: &str,
        #[case] expected_b: &str,
    ) {
        let mut ledger = MemoryLedger::with_entries([("A", balances.0), ("B", balances.1)]);

        transfer(&mut ledger, &args(&["A", "B", amount]), DecodeMode::Lenient).unwrap();

        assert_eq!(ledger.get_str("A").as_deref(), Some(expected_a));
        assert_eq!(ledger.get_str("B").as_deref(), Some(expected_b));
    }

    #[rstest]
    #[case::amount_above_range(
        ("100", "-9223372036854775000"),
        "99999999999999999999",
        "-9223372036854775707",
        "809"
    )]
    #[case::balance_above_range(("99999999999999999999", "0"), "1", "9223372036854775806", "3")]
    #[case::balance_below_range(("-99999999999999999999", "0"), "-1", "-9223372036854775807", "1")]
    fn test_transfer_lenient_decode_saturates_out_of_range(
        #[case] balances: (&str, &str),
        #[case] amount: &str,
        #[case] expected_a: &str,
        #[case] expected_b: &str,
    ) {
        let mut ledger = MemoryLedger::with_entries([("A", balances.0), ("B", balances.1)]);

        transfer(&mut ledger, &args(&["A", "B", amount]), DecodeMode::Lenient).unwrap();

        assert_eq!(ledger.get_str("A").as_deref(), Some(expected_a));
        assert_eq!(ledger.get_str("B").as_deref(), Some(expected_b));
    }

    #[rstest]
    #[case::amount_above_range(("100", "50"), "99999999999999999999", "B")]
    #[case::amount_below_range(("100", "50"), "-99999999999999999999", "A")]
    fn test_transfer_lenient_out_of_range_overflows(
        #[case] balances: (&str, &str),
        #[case] amount: &str,
        #[case] overflowing_key: &str,
    ) {
        let mut ledger =
            FaultyLedger::new(MemoryLedger::with_entries([("A", balances.0), ("B", balances.1)]));

        let result = transfer(&mut ledger, &args(&["A", "B", amount]), DecodeMode::Lenient);

        assert_eq!(result, Err(HandlerError::arithmetic_overflow("invoke", overflowing_key)));
        assert!(ledger.writes.is_empty());
    }

    #[test]
    fn test_amount_label_cannot_collide_with_balance_key() {
        let mut ledger = MemoryLedger::with_entries([("amount", "oops"), ("B", "1")]);

        let bad_balance = transfer(&mut ledger, &args(&["amount", "B", "1"]), DecodeMode::Strict);
        assert!(matches!(bad_balance, Err(HandlerError::ValueDecode { key, .. }) if key == "amount"));

        ledger.put("amount", b"5").unwrap();
        let bad_amount = transfer(&mut ledger, &args(&["amount", "B", "x"]), DecodeMode::Strict);
        assert!(matches!(bad_amount, Err(HandlerError::ValueDecode { key, .. }) if key == AMOUNT_LABEL));
    }

    #[test]
    fn test_transfer_non_utf8_balance() {
        let mut ledger = MemoryLedger::new();
        ledger.put("A", &[0xff, 0xfe]).unwrap();
        ledger.put("B", b"1").unwrap();

        let result = transfer(&mut ledger, &args(&["A", "B", "1"]), DecodeMode::Strict);
        assert!(matches!(result, Err(HandlerError::ValueDecode { key, .. }) if key == "A"));
    }

    #[test]
    fn test_transfer_overflow_writes_nothing() {
        let max = i64::MAX.to_string();
        let mut ledger =
            FaultyLedger::new(MemoryLedger::with_entries([("A", "0"), ("B", max.as_str())]));

        let result = transfer(&mut ledger, &args(&["A", "B", "0"]), DecodeMode::Strict);

        assert_eq!(result, Err(HandlerError::arithmetic_overflow("invoke", "B")));
        assert!(ledger.writes.is_empty());
    }

    #[test]
    fn test_delete_entity_removes_key() {
        let mut ledger = seeded();

        assert_eq!(delete_entity(&mut ledger, &args(&["A"])), Ok(None));
        assert_eq!(ledger.get("A").unwrap(), None);
        assert_eq!(ledger.get_str("B").as_deref(), Some("50"));
    }

    #[test]
    fn test_delete_entity_absent_key_is_noop() {
        let mut ledger = seeded();
        assert_eq!(delete_entity(&mut ledger, &args(&["missing"])), Ok(None));
        assert_eq!(ledger.len(), 2);
    }

    #[rstest]
    #[case(&[])]
    #[case(&["A", "B"])]
    fn test_delete_entity_wrong_arg_count(#[case] values: &[&str]) {
        let mut ledger = seeded();
        assert_eq!(
            delete_entity(&mut ledger, &args(values)),
            Err(HandlerError::argument_count("delete", 1, values.len()))
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_delete_entity_storage_failure() {
        let mut ledger = FaultyLedger::new(seeded()).failing_delete("A");

        let result = delete_entity(&mut ledger, &args(&["A"]));

        assert!(matches!(result, Err(HandlerError::StorageDelete { key, .. }) if key == "A"));
        assert_eq!(ledger.inner.get_str("A").as_deref(), Some("100"));
    }

    #[test]
    fn test_query_stub_returns_no_payload() {
        assert_eq!(query("query", &args(&["A"])), Ok(None));
    }

    #[rstest]
    #[case("invoke")]
    #[case("Query")]
    #[case("")]
    fn test_query_rejects_other_functions(#[case] function: &str) {
        assert_eq!(
            query(function, &args(&["A"])),
            Err(HandlerError::invalid_query_function(function))
        );
    }

    #[test]
    fn test_query_checks_function_before_args() {
        assert_eq!(
            query("read", &[]),
            Err(HandlerError::invalid_query_function("read"))
        );
        assert_eq!(
            query("query", &[]),
            Err(HandlerError::argument_count("query", 1, 0))
        );
    }

    #[test]
    fn test_query_diagnostic_digest_is_stable() {
        let digest = hex::encode(Sha256::digest(QUERY_DIAGNOSTIC_INPUT));
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hex::encode(Sha256::digest(b"123ABC456")));
    }
}
