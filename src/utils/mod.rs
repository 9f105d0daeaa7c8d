pub mod eth_address_validator;

#[cfg(test)]
pub mod test_app_state;
