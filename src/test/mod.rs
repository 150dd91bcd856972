mod forwarding;
mod topology;
mod transmit;
