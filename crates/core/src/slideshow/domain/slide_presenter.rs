use crate::shared::group::Group;
use crate::slideshow::domain::slide::Slide;

/// Where slides end up. Called from the slideshow thread only.
pub trait SlidePresenter: Send + Sync {
    fn show(&self, slide: &Slide) -> Result<(), Box<dyn std::error::Error>>;

    /// The slideshow for `group` has ended.
    fn close(&self, group: &Group) -> Result<(), Box<dyn std::error::Error>>;
}
