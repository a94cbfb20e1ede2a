mod detail_panel;
mod failure_list;
mod layout;
mod notifications;
mod search_box;
mod status_bar;
mod test_list;
pub mod theme;

pub use layout::draw;
