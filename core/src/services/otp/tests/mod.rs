mod mocks;

pub(crate) use mocks::MockStore;
