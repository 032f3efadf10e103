mod request_handler;

pub(crate) use request_handler::RequestHandler;
