pub mod autocomplete_model;
pub mod favorites_model;
pub mod forecast_model;
pub mod weather_model;

pub use autocomplete_model::{
    AutocompleteModel, AutocompleteSettings, EnterBehavior, Key, KeyOutcome, SearchRequest,
    Selection,
};
pub use favorites_model::{CardState, FavoriteCard, FavoritesModel};
pub use forecast_model::{ForecastCard, ForecastDisplay, ForecastModel, ForecastStatus};
pub use weather_model::{AddFavoriteOutcome, WeatherDisplay, WeatherModel};
