/// Integration tests running extracted text through segmentation and
/// classification with scripted language-model backends.

mod helpers;
mod pipeline;
