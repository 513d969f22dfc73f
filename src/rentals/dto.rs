use serde::Deserialize;

/// Request body for creating or re-dating a rental. Dates arrive as strings
/// and go through the range validator before touching the store.
#[derive(Debug, Deserialize)]
pub struct RentalDatesRequest {
    pub rental_date: String,
    pub return_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_dates() {
        assert!(serde_json::from_str::<RentalDatesRequest>(r#"{"rental_date":"2024-01-01"}"#)
            .is_err());
    }

    #[test]
    fn parses_both_dates() {
        let req: RentalDatesRequest =
            serde_json::from_str(r#"{"rental_date":"2024-01-01","return_date":"2024-01-10"}"#)
                .unwrap();
        assert_eq!(req.rental_date, "2024-01-01");
        assert_eq!(req.return_date, "2024-01-10");
    }
}
