use crate::blockchain::client::ClientError;
use crate::models::{Output, TransactionData, TransactionSummary};
use std::collections::{HashMap, HashSet};

/// The output receiving the most USD; the first one listed wins a tie
pub fn biggest_recipient(outputs: &[Output]) -> Option<&Output> {
    let mut best: Option<&Output> = None;
    for output in outputs {
        if best.map_or(true, |current| output.value_usd > current.value_usd) {
            best = Some(output);
        }
    }
    best
}

/// Biggest recipients of the page's transactions, for the tracked-address lookup
pub fn recipient_candidates(
    page_ids: &[String],
    tx_data: &HashMap<String, TransactionData>,
) -> HashSet<String> {
    page_ids
        .iter()
        .filter_map(|id| tx_data.get(id))
        .filter_map(|tx| biggest_recipient(&tx.outputs))
        .map(|output| output.recipient.clone())
        .collect()
}

/// Builds the display summaries for one page, in page order
pub fn aggregate(
    page_ids: &[String],
    tx_data: &HashMap<String, TransactionData>,
    known_addresses: &HashSet<String>,
) -> Result<Vec<TransactionSummary>, ClientError> {
    page_ids
        .iter()
        .map(|id| {
            let tx = tx_data.get(id).ok_or_else(|| {
                ClientError::RemoteDataMissing(format!("no data for transaction {}", id))
            })?;

            let recipient = biggest_recipient(&tx.outputs).ok_or_else(|| {
                ClientError::RemoteShapeError(format!("transaction {} has no outputs", id))
            })?;

            Ok(TransactionSummary {
                id: id.clone(),
                timestamp: tx.time,
                amount_usd: tx.output_total_usd,
                fee_usd: tx.fee_usd,
                biggest_recipient_address: recipient.recipient.clone(),
                biggest_recipient_amount_usd: recipient.value_usd,
                biggest_recipient_tracked: known_addresses.contains(&recipient.recipient),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn output(recipient: &str, value: i64) -> Output {
        Output {
            recipient: recipient.to_string(),
            value_usd: Decimal::from(value),
        }
    }

    fn tx(outputs: Vec<Output>) -> TransactionData {
        TransactionData {
            time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            output_total_usd: outputs.iter().map(|o| o.value_usd).sum(),
            fee_usd: Decimal::new(150, 2),
            outputs,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn picks_largest_output_per_transaction() {
        let data = HashMap::from([
            ("A".to_string(), tx(vec![output("x", 5), output("y", 9)])),
            ("B".to_string(), tx(vec![output("z", 3)])),
        ]);

        let summaries = aggregate(&ids(&["A", "B"]), &data, &HashSet::new()).unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "A");
        assert_eq!(summaries[0].biggest_recipient_address, "y");
        assert_eq!(summaries[0].biggest_recipient_amount_usd, Decimal::from(9));
        assert_eq!(summaries[0].amount_usd, Decimal::from(14));
        assert_eq!(summaries[1].biggest_recipient_address, "z");
    }

    #[test]
    fn ties_go_to_first_listed_output() {
        let outputs = vec![output("first", 7), output("second", 7), output("small", 1)];
        assert_eq!(biggest_recipient(&outputs).unwrap().recipient, "first");
        assert_eq!(biggest_recipient(&[]), None);
    }

    #[test]
    fn preserves_page_order() {
        let data = HashMap::from([
            ("A".to_string(), tx(vec![output("x", 1)])),
            ("B".to_string(), tx(vec![output("y", 1)])),
            ("C".to_string(), tx(vec![output("z", 1)])),
        ]);

        let summaries = aggregate(&ids(&["C", "A", "B"]), &data, &HashSet::new()).unwrap();
        let order: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn flags_tracked_recipients() {
        let data = HashMap::from([
            ("A".to_string(), tx(vec![output("mine", 10), output("other", 2)])),
            ("B".to_string(), tx(vec![output("stranger", 4)])),
        ]);
        let known = HashSet::from(["mine".to_string()]);

        let summaries = aggregate(&ids(&["A", "B"]), &data, &known).unwrap();
        assert!(summaries[0].biggest_recipient_tracked);
        assert!(!summaries[1].biggest_recipient_tracked);
    }

    #[test]
    fn missing_transaction_is_an_error() {
        let data = HashMap::from([("A".to_string(), tx(vec![output("x", 1)]))]);

        let result = aggregate(&ids(&["A", "gone"]), &data, &HashSet::new());
        assert!(matches!(result, Err(ClientError::RemoteDataMissing(_))));
    }

    #[test]
    fn transaction_without_outputs_is_an_error() {
        let data = HashMap::from([("A".to_string(), tx(vec![]))]);

        let result = aggregate(&ids(&["A"]), &data, &HashSet::new());
        assert!(matches!(result, Err(ClientError::RemoteShapeError(_))));
    }

    #[test]
    fn candidates_are_the_biggest_recipients() {
        let data = HashMap::from([
            ("A".to_string(), tx(vec![output("x", 5), output("y", 9)])),
            ("B".to_string(), tx(vec![output("z", 3)])),
        ]);

        let candidates = recipient_candidates(&ids(&["A", "B", "missing"]), &data);
        assert_eq!(candidates, HashSet::from(["y".to_string(), "z".to_string()]));
    }
}
