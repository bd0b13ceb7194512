//! Order reconciliation against recorded snapshot histories.

use rust_decimal_macros::dec;
use testresult::TestResult;

use storefront_cart::prelude::*;

#[test]
fn partial_return_fixture() -> TestResult {
    let snapshots = Fixture::new().load_order("partial_return")?;

    let returned = reconcile(&snapshots);

    assert_eq!(
        returned,
        vec![ReturnedLine {
            product_id: ProductId::from("p-rice"),
            original_quantity: 3,
            current_quantity: 1,
            returned_quantity: 2,
            returned_value: dec!(4.40),
        }]
    );
    assert_eq!(returned_total(&returned), Some(dec!(4.40)));

    Ok(())
}

#[test]
fn shuffling_snapshot_order_changes_nothing() -> TestResult {
    let snapshots = Fixture::new().load_order("partial_return")?;
    let expected = reconcile(&snapshots);

    let mut reversed = snapshots.clone();
    reversed.reverse();

    assert_eq!(reconcile(&reversed), expected);

    let mut rotated = snapshots;
    rotated.rotate_left(1);

    assert_eq!(reconcile(&rotated), expected);

    Ok(())
}

#[test]
fn only_first_and_last_are_compared() -> TestResult {
    let snapshots = Fixture::new().load_order("partial_return")?;

    // The middle snapshot (2024-05-02) dropped rice to 2, but the outcome is
    // measured from 2024-05-01 to 2024-05-03.
    let returned = reconcile(&snapshots);

    assert_eq!(returned.len(), 1);
    assert_eq!(returned.first().map(|l| l.current_quantity), Some(1));

    Ok(())
}

#[test]
fn lists_can_be_compared_directly() {
    let first = [
        SnapshotProduct::new("p1", 10, dec!(5)),
        SnapshotProduct::new("p2", 1, dec!(9.99)),
    ];
    let last = [SnapshotProduct::new("p1", 4, dec!(5))];

    let returned = returned_between(&first, &last);

    assert_eq!(returned.len(), 1);
    assert_eq!(returned.first().map(|l| l.returned_value), Some(dec!(30)));
}
