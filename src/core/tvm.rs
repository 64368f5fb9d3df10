pub fn future_value(present_value: f64, rate: f64, periods: u32) -> f64 {
    present_value * (1.0 + rate).powi(periods as i32)
}

pub fn future_value_of_series(payment: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return payment * periods as f64;
    }
    payment * ((1.0 + rate).powi(periods as i32) - 1.0) / rate
}

pub fn present_value_of_annuity(annual_payment: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return annual_payment * periods as f64;
    }
    annual_payment * (1.0 - (1.0 + rate).powi(-(periods as i32))) / rate
}

pub fn required_level_contribution(
    target_future_value: f64,
    current_principal: f64,
    rate: f64,
    periods: u32,
) -> f64 {
    let gap = (target_future_value - future_value(current_principal, rate, periods)).max(0.0);
    if gap == 0.0 {
        return 0.0;
    }
    if periods == 0 {
        return gap;
    }
    if rate == 0.0 {
        return gap / periods as f64;
    }
    gap * rate / ((1.0 + rate).powi(periods as i32) - 1.0)
}

pub fn monthly_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    if years == 0 {
        return principal.max(0.0);
    }
    let periods = f64::from(years) * 12.0;
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / periods;
    }
    principal * r / (1.0 - (1.0 + r).powf(-periods))
}
