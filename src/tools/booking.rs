//! 酒店预订工具：模拟下单，生成确认号
//!
//! 日期必须为 YYYY-MM-DD、客人数 ≥ 1；校验失败时返回可读错误文本（Ok 返回，不抛错），
//! 由上层原样透传给用户。

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

/// 预订参数
#[derive(Debug, Deserialize)]
pub struct BookingArgs {
    pub hotel_name: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub num_guests: i64,
}

/// 酒店预订工具（模拟）：校验入参并生成确认号
#[derive(Default)]
pub struct HotelBookingTool;

fn valid_date(d: &str) -> bool {
    NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok()
}

impl HotelBookingTool {
    fn book(&self, args: &BookingArgs) -> String {
        if !valid_date(&args.check_in_date) || !valid_date(&args.check_out_date) {
            return "Error: Invalid date format. Please use YYYY-MM-DD.".to_string();
        }
        if args.num_guests <= 0 {
            return "Error: Number of guests must be at least 1.".to_string();
        }

        let mut hasher = DefaultHasher::new();
        args.hotel_name.hash(&mut hasher);
        let confirmation_number = format!(
            "HB-{}-{}",
            Local::now().format("%Y%m%d%H%M%S"),
            hasher.finish() % 10000
        );
        format!(
            "Successfully booked {} for {} guest(s) from {} to {}.\nConfirmation number: {}",
            args.hotel_name,
            args.num_guests,
            args.check_in_date,
            args.check_out_date,
            confirmation_number
        )
    }
}

#[async_trait]
impl Tool for HotelBookingTool {
    fn name(&self) -> &str {
        "book_hotel"
    }

    fn description(&self) -> &str {
        "Book a hotel given hotel name, check-in date, check-out date, and number of guests."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "hotel_name": { "type": "string" },
                "check_in_date": { "type": "string", "description": "YYYY-MM-DD" },
                "check_out_date": { "type": "string", "description": "YYYY-MM-DD" },
                "num_guests": { "type": "integer", "minimum": 1 }
            },
            "required": ["hotel_name", "check_in_date", "check_out_date", "num_guests"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: BookingArgs =
            serde_json::from_value(args).map_err(|e| format!("Invalid booking args: {e}"))?;
        Ok(self.book(&args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(check_in: &str, check_out: &str, guests: i64) -> Value {
        serde_json::json!({
            "hotel_name": "Taj Palace",
            "check_in_date": check_in,
            "check_out_date": check_out,
            "num_guests": guests,
        })
    }

    #[tokio::test]
    async fn test_successful_booking_has_confirmation() {
        let tool = HotelBookingTool;
        let out = tool
            .execute(args("2025-09-10", "2025-09-15", 2))
            .await
            .unwrap();
        assert!(out.contains("Successfully booked Taj Palace"));
        assert!(out.contains("Confirmation number: HB-"));
    }

    #[tokio::test]
    async fn test_invalid_date_is_readable_text() {
        let tool = HotelBookingTool;
        let out = tool
            .execute(args("10/09/2025", "2025-09-15", 2))
            .await
            .unwrap();
        assert_eq!(out, "Error: Invalid date format. Please use YYYY-MM-DD.");
    }

    #[tokio::test]
    async fn test_zero_guests_rejected() {
        let tool = HotelBookingTool;
        let out = tool
            .execute(args("2025-09-10", "2025-09-15", 0))
            .await
            .unwrap();
        assert_eq!(out, "Error: Number of guests must be at least 1.");
    }
}
