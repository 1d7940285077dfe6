use ::mockito::ServerGuard;

pub mod factory;
pub mod mockito;

pub struct ProviderFixtures<'a> {
    pub server: &'a mut ServerGuard,
}
