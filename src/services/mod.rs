pub mod feature_service;
pub mod random_forest;
pub mod reputation_service;
pub mod scaler;
pub mod text_service;
pub mod trend_forecasting_service;
pub mod trend_model_service;
