//! Financial ratios and period-over-period comparison.

use rust_decimal::Decimal;

use super::types::{
    BalanceSheetReport, FinancialRatios, IncomeStatementReport, MetricComparison,
    PeriodComparison, Trend,
};

/// Percent change at or below which a metric counts as stable.
pub const STABLE_THRESHOLD_PERCENT: Decimal = Decimal::ONE;

/// Headline ratios from an income statement and a balance sheet.
#[must_use]
pub fn financial_ratios(
    income: &IncomeStatementReport,
    balance_sheet: &BalanceSheetReport,
) -> FinancialRatios {
    FinancialRatios {
        current_ratio: ratio(balance_sheet.total_assets, balance_sheet.total_liabilities),
        debt_ratio: ratio(balance_sheet.total_liabilities, balance_sheet.total_assets),
        net_profit_margin: percent(income.net_income, income.total_revenue),
        gross_profit_margin: percent(income.gross_profit, income.total_revenue),
        return_on_equity: percent(income.net_income, balance_sheet.total_equity),
    }
}

/// Compares the headline income statement metrics of two periods.
#[must_use]
pub fn compare_periods(
    current: &IncomeStatementReport,
    previous: &IncomeStatementReport,
) -> PeriodComparison {
    PeriodComparison {
        revenue: compare_metric(current.total_revenue, previous.total_revenue),
        expenses: compare_metric(current.total_expenses, previous.total_expenses),
        gross_profit: compare_metric(current.gross_profit, previous.gross_profit),
        net_income: compare_metric(current.net_income, previous.net_income),
    }
}

/// Compares one value across two periods.
///
/// Without a previous value there is no percent change; any movement then
/// counts as a trend.
#[must_use]
pub fn compare_metric(current: Decimal, previous: Decimal) -> MetricComparison {
    let change = current - previous;
    let change_percent = percent(change, previous.abs());
    let moved = match change_percent {
        Some(pct) => pct.abs() > STABLE_THRESHOLD_PERCENT,
        None => !change.is_zero(),
    };
    let trend = match (moved, change.is_sign_positive()) {
        (false, _) => Trend::Stable,
        (true, true) => Trend::Up,
        (true, false) => Trend::Down,
    };

    MetricComparison {
        current,
        previous,
        change,
        change_percent,
        trend,
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator).map(|r| r.round_dp(4))
}

fn percent(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|n| n.checked_div(denominator))
        .map(|r| r.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::reports::types::StatementSection;

    fn income(
        revenue: Decimal,
        expenses: Decimal,
        cost_of_sales: Decimal,
    ) -> IncomeStatementReport {
        let net_income = revenue - expenses;
        IncomeStatementReport {
            period_start: None,
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            currency: "USD".to_string(),
            revenue: StatementSection::default(),
            expenses: StatementSection::default(),
            total_revenue: revenue,
            total_expenses: expenses,
            cost_of_sales,
            gross_profit: revenue - cost_of_sales,
            net_income,
            is_profit: net_income >= Decimal::ZERO,
        }
    }

    fn sheet(assets: Decimal, liabilities: Decimal, equity: Decimal) -> BalanceSheetReport {
        BalanceSheetReport {
            as_of: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            currency: "USD".to_string(),
            assets: StatementSection::default(),
            liabilities: StatementSection::default(),
            equity: StatementSection::default(),
            current_earnings: Decimal::ZERO,
            total_assets: assets,
            total_liabilities: liabilities,
            total_equity: equity,
            total_liabilities_and_equity: liabilities + equity,
            is_balanced: assets == liabilities + equity,
        }
    }

    #[test]
    fn test_financial_ratios() {
        let ratios = financial_ratios(
            &income(dec!(1000), dec!(600), dec!(400)),
            &sheet(dec!(5000), dec!(2000), dec!(3000)),
        );

        assert_eq!(ratios.current_ratio, Some(dec!(2.5)));
        assert_eq!(ratios.debt_ratio, Some(dec!(0.4)));
        assert_eq!(ratios.net_profit_margin, Some(dec!(40)));
        assert_eq!(ratios.gross_profit_margin, Some(dec!(60)));
        assert_eq!(ratios.return_on_equity, Some(dec!(13.33)));
    }

    #[test]
    fn test_financial_ratios_zero_denominators() {
        let ratios = financial_ratios(
            &income(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            &sheet(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        );
        assert_eq!(ratios, FinancialRatios::default());
    }

    #[rstest]
    #[case(dec!(110), dec!(100), Some(dec!(10)), Trend::Up)]
    #[case(dec!(90), dec!(100), Some(dec!(-10)), Trend::Down)]
    #[case(dec!(100.5), dec!(100), Some(dec!(0.5)), Trend::Stable)]
    #[case(dec!(101), dec!(100), Some(dec!(1)), Trend::Stable)]
    #[case(dec!(100), dec!(100), Some(dec!(0)), Trend::Stable)]
    #[case(dec!(50), dec!(0), None, Trend::Up)]
    #[case(dec!(0), dec!(0), None, Trend::Stable)]
    #[case(dec!(-50), dec!(-100), Some(dec!(50)), Trend::Up)]
    fn test_compare_metric(
        #[case] current: Decimal,
        #[case] previous: Decimal,
        #[case] percent: Option<Decimal>,
        #[case] trend: Trend,
    ) {
        let comparison = compare_metric(current, previous);
        assert_eq!(comparison.change, current - previous);
        assert_eq!(comparison.change_percent, percent);
        assert_eq!(comparison.trend, trend);
    }

    #[test]
    fn test_compare_periods() {
        let comparison = compare_periods(
            &income(dec!(1200), dec!(700), dec!(300)),
            &income(dec!(1000), dec!(700), dec!(300)),
        );
        assert_eq!(comparison.revenue.trend, Trend::Up);
        assert_eq!(comparison.expenses.trend, Trend::Stable);
        assert_eq!(comparison.net_income.change, dec!(200));
        assert_eq!(comparison.net_income.change_percent, Some(dec!(66.67)));
    }
}
