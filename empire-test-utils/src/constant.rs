pub static TEST_ENTITY_SLUG: &str = "empire-holdings";
pub static TEST_TOKEN: &str = "secret-token:abc123456789";
pub static TEST_ACCOUNT_ID: &str = "acc-operating-001";
