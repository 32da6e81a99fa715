//! Port error constructors and messages.

use super::*;
use rstest::rstest;
use rust_decimal::Decimal;

#[rstest]
fn duplicate_km_message_names_the_key() {
    let err = StationRepositoryError::duplicate_km(Decimal::new(2_500, 3));
    assert_eq!(err.to_string(), "a station already exists at km 2.500");
}

#[rstest]
fn measurement_duplicate_names_the_station_km() {
    let err = MeasurementRepositoryError::duplicate_km(Decimal::new(5_000, 3));
    assert_eq!(
        err.to_string(),
        "a measurement already exists at station km 5.000"
    );
}

#[rstest]
fn unit_variants_get_constructors() {
    assert_eq!(
        IdentityError::missing_credential(),
        IdentityError::MissingCredential
    );
    assert_eq!(
        IdentityError::invalid_credential("expired").to_string(),
        "invalid bearer credential: expired"
    );
}

#[rstest]
#[case(ProjectRepositoryError::connection("refused").to_string(), "project repository connection failed: refused")]
#[case(ReadingRepositoryError::missing(7).to_string(), "reading 7 no longer exists")]
#[case(UserProfileRepositoryError::query("syntax error").to_string(), "user profile repository query failed: syntax error")]
#[case(StationRepositoryError::connection("timeout").to_string(), "station repository connection failed: timeout")]
#[case(UserProfileRepositoryError::duplicate_email("a@b.mx").to_string(), "a profile already exists for a@b.mx")]
fn messages_carry_context(#[case] actual: String, #[case] expected: &str) {
    assert_eq!(actual, expected);
}

#[rstest]
fn repository_errors_share_storage_variants() {
    assert_eq!(
        MeasurementRepositoryError::query("deadlock"),
        MeasurementRepositoryError::Query {
            message: "deadlock".to_owned()
        }
    );
    assert!(matches!(
        ReadingRepositoryError::connection("refused"),
        ReadingRepositoryError::Connection { .. }
    ));
}
