mod auto_skip;
mod media_player;

pub use crate::player::auto_skip::AutoSkipTimer;
pub use crate::player::media_player::MediaPlayer;
