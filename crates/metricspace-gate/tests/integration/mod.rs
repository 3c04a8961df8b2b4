mod limit_properties;
mod persistence;
mod rollover;
mod scenarios;
